//! Error type shared by the sampler, the boundary families, and the generators.

use std::fmt;

/// Failure modes of a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenError {
    /// Caller-supplied parameters are out of range (`n == 0`, negative `gamma`, ...).
    InvalidArgument { reason: String },
    /// The rejection streak limit was hit (or `gamma` is out of reach) before
    /// `requested` points cleared the margin.
    MarginUnsatisfiable {
        gamma: f64,
        attempts: u64,
        accepted: usize,
        requested: usize,
    },
    /// Every label in a dataset is the same class.
    DegenerateLabels { reason: String },
}

impl GenError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateLabels {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::MarginUnsatisfiable {
                gamma,
                attempts,
                accepted,
                requested,
            } => write!(
                f,
                "margin unsatisfiable: gamma={gamma} accepted {accepted}/{requested} points after {attempts} attempts"
            ),
            Self::DegenerateLabels { reason } => write!(f, "degenerate label set: {reason}"),
        }
    }
}

impl std::error::Error for GenError {}
