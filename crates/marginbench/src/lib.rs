//! Margin-gated synthetic benchmark generator.
//!
//! Produces labeled point sets separated by a randomly drawn boundary (hyperplane,
//! polynomial curve, ellipse, rectangle), where every point lies farther than a
//! requested margin `gamma` from that boundary.
//!
//! Layers (leaves first)
//! - `sampler`: uniform random vectors, replay tokens, the bounded rejection loop.
//! - `boundary`: per-family distance functions and labeling rules.
//! - `generate`: the per-family generators and the `Dataset` they return.
//! - `label`: two-class labels and the diversity check used by orchestrators.
//!
//! Nothing here performs I/O or keeps state across calls.

pub mod boundary;
pub mod error;
pub mod generate;
pub mod label;
pub mod sampler;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use boundary::{Boundary, DecisionBoundary, Family};
pub use error::GenError;
pub use generate::{generate, generate_replay, Dataset, FamilyParams, GenerateSpec};
pub use label::{is_degenerate, Label};
pub use sampler::{Point, ReplayToken, SamplerCfg};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::boundary::{
        Boundary, DecisionBoundary, Ellipse, Family, Hyperplane, PolyCurve, Rect,
    };
    pub use crate::error::GenError;
    pub use crate::generate::{
        generate, generate_ellipse, generate_linear, generate_polynomial, generate_rectangle,
        generate_replay, Dataset, FamilyParams, GenerateSpec,
    };
    pub use crate::label::{is_degenerate, Label};
    pub use crate::sampler::{draw_passing_gamma, random_vector, Point, ReplayToken, SamplerCfg};
}
