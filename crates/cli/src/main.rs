use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use marginbench::{Family, FamilyParams, GenerateSpec, SamplerCfg};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod experiment;
mod export;
mod plot;
mod provenance;
mod svc;

use experiment::{ErrorSweep, ExperimentCfg, MarginSweep, Tokens, TrialCfg};
use provenance::{write_sidecar, Payload};
use svc::{Kernel, Svc, SvcParams};

#[derive(Parser)]
#[command(name = "marginbench")]
#[command(about = "Margin-gated benchmark generator and SVC experiment runner")]
struct Cmd {
    /// Seed for the replay-token stream; equal seeds reproduce every dataset
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    /// Consecutive rejected draws before the sampler reports an unsatisfiable margin
    #[arg(long, global = true, default_value_t = SamplerCfg::default().max_attempts_per_point)]
    max_attempts_per_point: u64,

    /// Fresh draws allowed when a dataset comes back single-class
    #[arg(long, global = true, default_value_t = ExperimentCfg::default().max_regenerations)]
    max_regenerations: u32,

    #[command(subcommand)]
    action: Action,
}

impl Cmd {
    fn experiment_cfg(&self) -> ExperimentCfg {
        ExperimentCfg {
            seed: self.seed,
            sampler: SamplerCfg {
                max_attempts_per_point: self.max_attempts_per_point,
            },
            max_regenerations: self.max_regenerations,
        }
    }
}

/// Boundary family and its shape parameters.
#[derive(Args, Clone, Debug)]
struct FamilyArgs {
    /// hyperplane | polynomial | ellipse | rectangle
    #[arg(long)]
    family: Family,
    /// Point dimension (hyperplane only)
    #[arg(long, default_value_t = 2)]
    dim: usize,
    /// Polynomial degree (polynomial only)
    #[arg(long, default_value_t = 2)]
    degree: usize,
    /// Force the ellipse to a circle
    #[arg(long)]
    circle: bool,
    /// Coordinate and boundary scale
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

impl FamilyArgs {
    fn params(&self) -> FamilyParams {
        match self.family {
            Family::Hyperplane => FamilyParams::Hyperplane { dim: self.dim },
            Family::Polynomial => FamilyParams::Polynomial {
                degree: self.degree,
            },
            Family::Ellipse => FamilyParams::Ellipse {
                circle: self.circle,
            },
            Family::Rectangle => FamilyParams::Rectangle,
        }
    }
}

/// Classifier hyperparameters.
#[derive(Args, Clone, Debug)]
struct SvcArgs {
    #[arg(long, value_enum, default_value_t = Kernel::Rbf)]
    kernel: Kernel,
    /// Soft-margin penalty
    #[arg(long, default_value_t = 1.0)]
    c: f64,
    /// RBF coefficient in exp(-gamma·|x-y|²)
    #[arg(long = "svc-gamma", default_value_t = 3.0)]
    svc_gamma: f64,
    /// Polynomial kernel exponent
    #[arg(long = "kernel-degree", default_value_t = 3.0)]
    kernel_degree: f64,
}

impl SvcArgs {
    fn params(&self) -> SvcParams {
        SvcParams {
            kernel: self.kernel,
            c: self.c,
            gamma: self.svc_gamma,
            degree: self.kernel_degree,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Generate one diverse dataset and write it as CSV (optionally plot it)
    Generate {
        #[command(flatten)]
        family: FamilyArgs,
        #[arg(long)]
        n: usize,
        /// Minimum distance between every point and the boundary
        #[arg(long)]
        gamma: f64,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Average restricted-training error counts over a range of n
    Collect {
        #[command(flatten)]
        family: FamilyArgs,
        #[command(flatten)]
        svc: SvcArgs,
        #[arg(long)]
        n_start: usize,
        #[arg(long)]
        n_end: usize,
        #[arg(long, default_value_t = 10)]
        iterations: usize,
        #[arg(long)]
        gamma: f64,
        /// Fraction of the points used for training, in [0, 1]
        #[arg(long, default_value_t = 0.5)]
        restriction: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Classifier margin of a fully trained SVC over a range of n
    Margin {
        #[command(flatten)]
        family: FamilyArgs,
        #[command(flatten)]
        svc: SvcArgs,
        #[arg(long)]
        n_start: usize,
        #[arg(long)]
        n_end: usize,
        #[arg(long)]
        gamma: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Boundary distance vs decision value for polynomials 1-4, an ellipse and a rectangle
    Trial {
        #[command(flatten)]
        svc: SvcArgs,
        #[arg(long)]
        n: usize,
        #[arg(long)]
        gamma: f64,
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Hold-out confusion counts (train on the first half) for the same cases as `trial`
    Confusion {
        #[command(flatten)]
        svc: SvcArgs,
        #[arg(long)]
        n: usize,
        #[arg(long)]
        gamma: f64,
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Plot one diverse 2D dataset, optionally shading a fitted classifier's regions
    Plot {
        #[command(flatten)]
        family: FamilyArgs,
        #[command(flatten)]
        svc: SvcArgs,
        #[arg(long)]
        n: usize,
        #[arg(long)]
        gamma: f64,
        #[arg(long)]
        with_classifier: bool,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = cmd.experiment_cfg();
    match cmd.action {
        Action::Generate {
            family,
            n,
            gamma,
            out,
            plot,
        } => generate(&cfg, &family, n, gamma, out, plot),
        Action::Collect {
            family,
            svc,
            n_start,
            n_end,
            iterations,
            gamma,
            restriction,
            out,
        } => {
            let sweep = ErrorSweep {
                params: family.params(),
                scale: family.scale,
                gamma,
                n_start,
                n_end,
                iterations,
                restriction,
                svc: svc.params(),
            };
            collect(&cfg, &sweep, out)
        }
        Action::Margin {
            family,
            svc,
            n_start,
            n_end,
            gamma,
            out,
        } => {
            let sweep = MarginSweep {
                params: family.params(),
                scale: family.scale,
                gamma,
                n_start,
                n_end,
                svc: svc.params(),
            };
            margin(&cfg, &sweep, out)
        }
        Action::Trial {
            svc,
            n,
            gamma,
            scale,
            out,
        } => {
            let trial = TrialCfg {
                n,
                gamma,
                scale,
                svc: svc.params(),
            };
            trial_run(&cfg, &trial, out)
        }
        Action::Confusion {
            svc,
            n,
            gamma,
            scale,
            out,
        } => {
            let trial = TrialCfg {
                n,
                gamma,
                scale,
                svc: svc.params(),
            };
            confusion_run(&cfg, &trial, out)
        }
        Action::Plot {
            family,
            svc,
            n,
            gamma,
            with_classifier,
            out,
        } => plot_run(&cfg, &family, &svc, n, gamma, with_classifier, out),
        Action::Report => report(&cfg),
    }
}

fn generate(
    cfg: &ExperimentCfg,
    family: &FamilyArgs,
    n: usize,
    gamma: f64,
    out: PathBuf,
    plot: Option<PathBuf>,
) -> Result<()> {
    let spec = GenerateSpec::new(family.params(), n, gamma).with_scale(family.scale);
    tracing::info!(family = %family.family, n, gamma, scale = family.scale, "generate");
    let (dataset, tok) = experiment::generate_diverse(&spec, &mut Tokens::new(cfg.seed), cfg)?;
    export::write_dataset(&out, &dataset)?;
    let params = json!({ "spec": spec, "cfg": cfg });
    write_sidecar(
        &out,
        Payload::new("generate", cfg.seed, params.clone()).with_replay(tok),
    )?;
    if let Some(fig) = plot {
        plot::plot_dataset(&fig, &dataset, family.scale, None)?;
        write_sidecar(&fig, Payload::new("generate", cfg.seed, params).with_replay(tok))?;
    }
    Ok(())
}

fn collect(cfg: &ExperimentCfg, sweep: &ErrorSweep, out: PathBuf) -> Result<()> {
    tracing::info!(
        family = %sweep.params.family(),
        n_start = sweep.n_start,
        n_end = sweep.n_end,
        iterations = sweep.iterations,
        restriction = sweep.restriction,
        kernel = ?sweep.svc.kernel,
        "collect"
    );
    let averages = experiment::collect_errors(sweep, cfg)?;
    export::write_pairs(&out, "n", "average_errors", &averages)?;
    write_sidecar(
        &out,
        Payload::new("collect", cfg.seed, json!({ "sweep": sweep, "cfg": cfg })),
    )?;
    Ok(())
}

fn margin(cfg: &ExperimentCfg, sweep: &MarginSweep, out: PathBuf) -> Result<()> {
    tracing::info!(
        family = %sweep.params.family(),
        n_start = sweep.n_start,
        n_end = sweep.n_end,
        kernel = ?sweep.svc.kernel,
        "margin"
    );
    let margins = experiment::margin_sweep(sweep, cfg)?;
    export::write_pairs(&out, "n", "margin", &margins)?;
    write_sidecar(
        &out,
        Payload::new("margin", cfg.seed, json!({ "sweep": sweep, "cfg": cfg })),
    )?;
    Ok(())
}

fn trial_run(cfg: &ExperimentCfg, trial: &TrialCfg, out: PathBuf) -> Result<()> {
    tracing::info!(n = trial.n, gamma = trial.gamma, kernel = ?trial.svc.kernel, "trial");
    let rows = experiment::distance_trial(trial, cfg)?;
    export::write_trial(&out, &rows)?;
    write_sidecar(
        &out,
        Payload::new("trial", cfg.seed, json!({ "trial": trial, "cfg": cfg })),
    )?;
    Ok(())
}

fn confusion_run(cfg: &ExperimentCfg, trial: &TrialCfg, out: PathBuf) -> Result<()> {
    tracing::info!(n = trial.n, gamma = trial.gamma, kernel = ?trial.svc.kernel, "confusion");
    let rows = experiment::confusion_trial(trial, cfg)?;
    export::write_confusion(&out, &rows)?;
    write_sidecar(
        &out,
        Payload::new("confusion", cfg.seed, json!({ "trial": trial, "cfg": cfg })),
    )?;
    Ok(())
}

fn plot_run(
    cfg: &ExperimentCfg,
    family: &FamilyArgs,
    svc: &SvcArgs,
    n: usize,
    gamma: f64,
    with_classifier: bool,
    out: PathBuf,
) -> Result<()> {
    let spec = GenerateSpec::new(family.params(), n, gamma).with_scale(family.scale);
    tracing::info!(family = %family.family, n, gamma, with_classifier, "plot");
    let (dataset, tok) = experiment::generate_diverse(&spec, &mut Tokens::new(cfg.seed), cfg)?;
    let svc_params = svc.params();
    let classifier = if with_classifier {
        Some(Svc::fit(&dataset.points, &dataset.labels, &svc_params)?)
    } else {
        None
    };
    plot::plot_dataset(&out, &dataset, family.scale, classifier.as_ref())?;
    write_sidecar(
        &out,
        Payload::new(
            "plot",
            cfg.seed,
            json!({
                "spec": spec,
                "cfg": cfg,
                "svc": with_classifier.then_some(svc_params),
            }),
        )
        .with_replay(tok),
    )?;
    Ok(())
}

fn report(cfg: &ExperimentCfg) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": marginbench::VERSION,
        "cfg": cfg,
        "families": Family::ALL,
        "svc_defaults": SvcParams::default(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
