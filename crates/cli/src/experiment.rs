//! Experiment orchestration: diverse dataset draws and the SVC sweeps built on them.
//!
//! Every dataset comes from a `ReplayToken` taken from one seeded `Tokens`
//! stream, so a whole sweep is reproducible from `--seed`.

use anyhow::{bail, Result};
use marginbench::{
    generate_replay, is_degenerate, Dataset, DecisionBoundary, FamilyParams, GenError,
    GenerateSpec, Label, Point, ReplayToken, SamplerCfg,
};
use serde::Serialize;

use crate::export::{ConfusionRow, TrialRow};
use crate::svc::{classifier_margin, confusion_test, Confusion, Svc, SvcParams};

/// Shared knobs for every experiment.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ExperimentCfg {
    pub seed: u64,
    pub sampler: SamplerCfg,
    /// Fresh draws allowed when a dataset comes back single-class.
    pub max_regenerations: u32,
}

impl Default for ExperimentCfg {
    fn default() -> Self {
        Self {
            seed: 0,
            sampler: SamplerCfg::default(),
            max_regenerations: 1000,
        }
    }
}

/// Sequential replay tokens under one seed.
#[derive(Clone, Debug)]
pub struct Tokens {
    next: ReplayToken,
}

impl Tokens {
    pub fn new(seed: u64) -> Self {
        Self {
            next: ReplayToken { seed, index: 0 },
        }
    }

    pub fn take(&mut self) -> ReplayToken {
        let tok = self.next;
        self.next = tok.next();
        tok
    }
}

/// Generate until both classes are present, consuming one token per attempt.
///
/// Returns the dataset and the token that produced it.
pub fn generate_diverse(
    spec: &GenerateSpec,
    tokens: &mut Tokens,
    cfg: &ExperimentCfg,
) -> Result<(Dataset, ReplayToken)> {
    generate_until(spec, tokens, cfg, |d| !d.is_degenerate())
}

/// Like `generate_diverse`, but the first `⌊n/2⌋` points must hold both classes too.
pub fn generate_diverse_halves(
    spec: &GenerateSpec,
    tokens: &mut Tokens,
    cfg: &ExperimentCfg,
) -> Result<(Dataset, ReplayToken)> {
    let half = spec.n / 2;
    generate_until(spec, tokens, cfg, |d| {
        !d.is_degenerate() && !is_degenerate(&d.labels[..half])
    })
}

fn generate_until<F>(
    spec: &GenerateSpec,
    tokens: &mut Tokens,
    cfg: &ExperimentCfg,
    accept: F,
) -> Result<(Dataset, ReplayToken)>
where
    F: Fn(&Dataset) -> bool,
{
    for attempt in 0..=cfg.max_regenerations {
        let tok = tokens.take();
        let dataset = generate_replay(spec, tok, &cfg.sampler)?;
        if accept(&dataset) {
            return Ok((dataset, tok));
        }
        tracing::warn!(
            family = %spec.params.family(),
            n = spec.n,
            attempt,
            index = tok.index,
            "single-class dataset, regenerating"
        );
    }
    Err(GenError::degenerate(format!(
        "{} draws of {} points were all single-class",
        u64::from(cfg.max_regenerations) + 1,
        spec.n
    ))
    .into())
}

/// Average restricted-training error counts over `n ∈ [n_start, n_end)`.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorSweep {
    pub params: FamilyParams,
    pub scale: f64,
    pub gamma: f64,
    pub n_start: usize,
    pub n_end: usize,
    pub iterations: usize,
    pub restriction: f64,
    pub svc: SvcParams,
}

pub fn collect_errors(sweep: &ErrorSweep, cfg: &ExperimentCfg) -> Result<Vec<(usize, f64)>> {
    check_range(sweep.n_start, sweep.n_end)?;
    if sweep.iterations == 0 {
        bail!("iterations must be > 0");
    }
    let mut tokens = Tokens::new(cfg.seed);
    let mut averages = Vec::with_capacity(sweep.n_end - sweep.n_start);
    for n in sweep.n_start..sweep.n_end {
        let spec = GenerateSpec::new(sweep.params, n, sweep.gamma).with_scale(sweep.scale);
        let mut total = 0usize;
        for _ in 0..sweep.iterations {
            let (dataset, _) = generate_diverse(&spec, &mut tokens, cfg)?;
            total += confusion_test(&dataset, sweep.restriction, &sweep.svc)?;
        }
        let average = total as f64 / sweep.iterations as f64;
        tracing::info!(n, average, "average errors");
        averages.push((n, average));
    }
    Ok(averages)
}

/// Classifier margin of an SVC fitted on the whole dataset, for each `n`.
#[derive(Clone, Debug, Serialize)]
pub struct MarginSweep {
    pub params: FamilyParams,
    pub scale: f64,
    pub gamma: f64,
    pub n_start: usize,
    pub n_end: usize,
    pub svc: SvcParams,
}

pub fn margin_sweep(sweep: &MarginSweep, cfg: &ExperimentCfg) -> Result<Vec<(usize, f64)>> {
    check_range(sweep.n_start, sweep.n_end)?;
    let mut tokens = Tokens::new(cfg.seed);
    let mut margins = Vec::with_capacity(sweep.n_end - sweep.n_start);
    for n in sweep.n_start..sweep.n_end {
        let spec = GenerateSpec::new(sweep.params, n, sweep.gamma).with_scale(sweep.scale);
        let (dataset, _) = generate_diverse(&spec, &mut tokens, cfg)?;
        let svc = Svc::fit(&dataset.points, &dataset.labels, &sweep.svc)?;
        let margin = classifier_margin(&svc.decision_values(&dataset.points)?);
        tracing::info!(n, margin, "classifier margin");
        margins.push((n, margin));
    }
    Ok(margins)
}

/// Shared settings of the per-case trials (`distance_trial`, `confusion_trial`).
#[derive(Clone, Debug, Serialize)]
pub struct TrialCfg {
    pub n: usize,
    pub gamma: f64,
    pub scale: f64,
    pub svc: SvcParams,
}

impl TrialCfg {
    /// Polynomials of degree 1–4, then an ellipse and a rectangle.
    pub fn cases() -> Vec<(String, FamilyParams)> {
        let mut cases: Vec<(String, FamilyParams)> = (1..=4)
            .map(|degree| {
                (
                    format!("polynomial-d{degree}"),
                    FamilyParams::Polynomial { degree },
                )
            })
            .collect();
        cases.push(("ellipse".into(), FamilyParams::Ellipse { circle: false }));
        cases.push(("rectangle".into(), FamilyParams::Rectangle));
        cases
    }
}

/// Per-point boundary distance against classifier decision value.
pub fn distance_trial(trial: &TrialCfg, cfg: &ExperimentCfg) -> Result<Vec<TrialRow>> {
    if trial.n < 2 {
        bail!("a distance trial needs n >= 2 (got {})", trial.n);
    }
    let mut tokens = Tokens::new(cfg.seed);
    let mut rows = Vec::new();
    for (case, params) in TrialCfg::cases() {
        let spec = GenerateSpec::new(params, trial.n, trial.gamma).with_scale(trial.scale);
        let (dataset, tok) = generate_diverse(&spec, &mut tokens, cfg)?;
        let svc = Svc::fit(&dataset.points, &dataset.labels, &trial.svc)?;
        let decisions = svc.decision_values(&dataset.points)?;
        tracing::info!(case = %case, index = tok.index, "distance trial");
        for ((p, label), decision) in dataset.iter().zip(decisions) {
            let distance = dataset.boundary.distance(p);
            rows.push(TrialRow {
                case: case.clone(),
                x: p[0],
                y: p[1],
                label: label.value(),
                distance,
                signed_distance: label.as_f64() * distance,
                decision,
            });
        }
    }
    Ok(rows)
}

/// For every trial case, fit on points `0..n/2` and tabulate predictions on `n/2..n`.
pub fn confusion_trial(trial: &TrialCfg, cfg: &ExperimentCfg) -> Result<Vec<ConfusionRow>> {
    if trial.n < 4 {
        bail!("a confusion trial needs n >= 4 (got {})", trial.n);
    }
    let half = trial.n / 2;
    let mut tokens = Tokens::new(cfg.seed);
    let mut rows = Vec::new();
    for (case, params) in TrialCfg::cases() {
        let spec = GenerateSpec::new(params, trial.n, trial.gamma).with_scale(trial.scale);
        let (dataset, tok) = generate_diverse_halves(&spec, &mut tokens, cfg)?;
        let (train_pts, test_pts): (&[Point], &[Point]) = dataset.points.split_at(half);
        let (train_labels, test_labels): (&[Label], &[Label]) = dataset.labels.split_at(half);
        let svc = Svc::fit(train_pts, train_labels, &trial.svc)?;
        let predicted = svc.predict(test_pts)?;
        let cm = Confusion::from_labels(test_labels, &predicted);
        tracing::info!(
            case = %case,
            index = tok.index,
            tp = cm.tp,
            fp = cm.fp,
            tn = cm.tn,
            fn_ = cm.fn_,
            "confusion trial"
        );
        rows.push(ConfusionRow { case, cm });
    }
    Ok(rows)
}

fn check_range(n_start: usize, n_end: usize) -> Result<()> {
    if n_start < 2 {
        bail!("n_start must be >= 2 so both classes can appear (got {n_start})");
    }
    if n_end <= n_start {
        bail!("empty range: n_end ({n_end}) must exceed n_start ({n_start})");
    }
    Ok(())
}
