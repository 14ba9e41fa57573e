//! Support-vector classifier glue over `linfa-svm`.
//!
//! - `Svc::fit` / `Svc::predict` delegate to linfa; `Svc::decision_values`
//!   rebuilds `f(x) = Σ αᵢ·k(xᵢ, x) − ρ` from the fitted model.
//! - `restricted_subset` + `confusion_test` measure how many points of a full
//!   dataset a classifier trained on a prefix gets wrong.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use linfa::prelude::*;
use linfa_svm::Svm;
use marginbench::{is_degenerate, Dataset, GenError, Label, Point};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;

/// Kernel family handed to linfa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf,
    Poly,
}

/// Classifier hyperparameters.
///
/// `gamma` is the scikit-style RBF coefficient `exp(-gamma·‖x−y‖²)`; `degree`
/// is the polynomial kernel exponent `(x·y + 1)^degree`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SvcParams {
    pub kernel: Kernel,
    pub c: f64,
    pub gamma: f64,
    pub degree: f64,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::Rbf,
            c: 1.0,
            gamma: 3.0,
            degree: 3.0,
        }
    }
}

impl SvcParams {
    fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            bail!("svc c must be finite and > 0 (got {})", self.c);
        }
        if self.kernel == Kernel::Rbf && !(self.gamma.is_finite() && self.gamma > 0.0) {
            bail!("rbf gamma must be finite and > 0 (got {})", self.gamma);
        }
        if self.kernel == Kernel::Poly && !(self.degree.is_finite() && self.degree >= 1.0) {
            bail!("polynomial kernel degree must be >= 1 (got {})", self.degree);
        }
        Ok(())
    }

    fn kernel_value(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self.kernel {
            Kernel::Linear => a.dot(&b),
            Kernel::Rbf => {
                let d2: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
                (-self.gamma * d2).exp()
            }
            Kernel::Poly => (a.dot(&b) + 1.0).powf(self.degree),
        }
    }
}

/// A fitted two-class SVC.
pub struct Svc {
    model: Svm<f64, bool>,
    support: Array2<f64>,
    params: SvcParams,
}

impl Svc {
    /// Fit on `points`/`labels`. Both classes must be present.
    pub fn fit(points: &[Point], labels: &[Label], params: &SvcParams) -> Result<Self> {
        params.validate()?;
        if points.len() != labels.len() {
            bail!(
                "points/labels length mismatch ({} vs {})",
                points.len(),
                labels.len()
            );
        }
        if is_degenerate(labels) {
            return Err(GenError::degenerate("training labels contain a single class").into());
        }
        let records = to_records(points)?;
        let targets: Array1<bool> = labels.iter().map(|&l| bool::from(l)).collect();
        let train = linfa::Dataset::new(records.clone(), targets);

        let base = Svm::<f64, bool>::params().pos_neg_weights(params.c, params.c);
        let base = match params.kernel {
            Kernel::Linear => base.linear_kernel(),
            Kernel::Rbf => base.gaussian_kernel(1.0 / params.gamma),
            Kernel::Poly => base.polynomial_kernel(1.0, params.degree),
        };
        let model = base
            .fit(&train)
            .with_context(|| format!("fitting {:?} SVC on {} points", params.kernel, points.len()))?;
        Ok(Self {
            model,
            support: records,
            params: *params,
        })
    }

    pub fn predict(&self, points: &[Point]) -> Result<Vec<Label>> {
        let records = to_records(points)?;
        if records.ncols() != self.support.ncols() {
            bail!(
                "expected {}-dimensional points, got {}",
                self.support.ncols(),
                records.ncols()
            );
        }
        let predicted: Array1<bool> = self.model.predict(&records);
        Ok(predicted.iter().map(|&b| Label::from(b)).collect())
    }

    /// Signed decision function per point; positive values lean towards `+1`.
    pub fn decision_values(&self, points: &[Point]) -> Result<Vec<f64>> {
        let records = to_records(points)?;
        if records.ncols() != self.support.ncols() {
            bail!(
                "expected {}-dimensional points, got {}",
                self.support.ncols(),
                records.ncols()
            );
        }
        let alpha = &self.model.alpha;
        let rho = self.model.rho;
        Ok(records
            .outer_iter()
            .map(|x| {
                let sum: f64 = alpha
                    .iter()
                    .zip(self.support.outer_iter())
                    .map(|(a, sv)| a * self.params.kernel_value(sv, x))
                    .sum();
                sum - rho
            })
            .collect())
    }
}

fn to_records(points: &[Point]) -> Result<Array2<f64>> {
    let dim = match points.first() {
        Some(p) => p.len(),
        None => bail!("no points"),
    };
    if points.iter().any(|p| p.len() != dim) {
        bail!("points have mixed dimensions");
    }
    Ok(Array2::from_shape_fn((points.len(), dim), |(i, j)| points[i][j]))
}

/// 2×2 confusion table with `+1` as the positive class.
///
/// Raw counts; linfa's `ConfusionMatrix` only hands back `f32` ratios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl Confusion {
    pub fn from_labels(truth: &[Label], predicted: &[Label]) -> Self {
        let mut cm = Confusion::default();
        for (t, p) in truth.iter().zip(predicted) {
            match (t, p) {
                (Label::Positive, Label::Positive) => cm.tp += 1,
                (Label::Negative, Label::Positive) => cm.fp += 1,
                (Label::Negative, Label::Negative) => cm.tn += 1,
                (Label::Positive, Label::Negative) => cm.fn_ += 1,
            }
        }
        cm
    }

    /// Misclassified points: false positives plus false negatives.
    pub fn errors(&self) -> usize {
        self.fp + self.fn_
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }
}

/// Training indices for a restriction fraction `r`.
///
/// Index 0 and the first index whose label differs from it always come first,
/// followed by `1..=⌊r·n⌋` (capped at `n−1`) without repeating that index.
pub fn restricted_subset(labels: &[Label], restriction: f64) -> Result<Vec<usize>> {
    if !(0.0..=1.0).contains(&restriction) {
        bail!("restriction must lie in [0, 1] (got {restriction})");
    }
    let Some(first) = labels.first() else {
        bail!("cannot restrict an empty dataset");
    };
    let Some(flip) = labels.iter().position(|l| l != first) else {
        return Err(GenError::degenerate("no sign change to seed the training subset").into());
    };
    let n = labels.len();
    let limit = ((restriction * n as f64).floor() as usize).min(n - 1);
    let mut subset = Vec::with_capacity(limit + 2);
    subset.push(0);
    subset.push(flip);
    subset.extend((1..=limit).filter(|&i| i != flip));
    Ok(subset)
}

/// Train on `restricted_subset`, predict the whole dataset, count `fp + fn`.
pub fn confusion_test(dataset: &Dataset, restriction: f64, params: &SvcParams) -> Result<usize> {
    let subset = restricted_subset(&dataset.labels, restriction)?;
    let points: Vec<Point> = subset.iter().map(|&i| dataset.points[i].clone()).collect();
    let labels: Vec<Label> = subset.iter().map(|&i| dataset.labels[i]).collect();
    let svc = Svc::fit(&points, &labels, params)?;
    let predicted = svc.predict(&dataset.points)?;
    let cm = Confusion::from_labels(&dataset.labels, &predicted);
    tracing::debug!(
        train = subset.len(),
        total = cm.total(),
        fp = cm.fp,
        fn_ = cm.fn_,
        "confusion test"
    );
    Ok(cm.errors())
}

/// Half the gap between the smallest positive and the largest non-positive decision value.
///
/// A missing side contributes 0.
pub fn classifier_margin(decision_values: &[f64]) -> f64 {
    let d_pos = decision_values
        .iter()
        .copied()
        .filter(|&d| d > 0.0)
        .reduce(f64::min)
        .unwrap_or(0.0);
    let d_neg = decision_values
        .iter()
        .copied()
        .filter(|&d| d <= 0.0)
        .reduce(f64::max)
        .unwrap_or(0.0);
    (0.5 * (d_pos - d_neg)).abs()
}
