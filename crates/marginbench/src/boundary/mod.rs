//! Decision-boundary families (hyperplane, polynomial curve, ellipse, rectangle).
//!
//! Purpose
//! - Each family pairs a distance function with a labeling rule over the *same*
//!   parameters, so the margin gate and the labels can never disagree about
//!   where the boundary is.
//! - `Boundary` is the tagged union handed back to callers; `Family` is its
//!   explicit discriminant (used by the CLI and by plotting).
//!
//! Code cross-refs: `crate::sampler::draw_passing_gamma`, `crate::generate`

mod ellipse;
mod hyperplane;
mod polynomial;
mod rectangle;

pub use ellipse::Ellipse;
pub use hyperplane::Hyperplane;
pub use polynomial::{PolyCurve, CURVE_SAMPLES_PER_SIDE};
pub use rectangle::Rect;

use crate::error::GenError;
use crate::label::Label;
use crate::sampler::Point;
use nalgebra::Vector2;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Distance and labeling rule of a boundary instance.
///
/// Both methods assume `p` has the boundary's dimension (2 except for hyperplanes).
pub trait DecisionBoundary {
    /// Geometric distance from `p` to the boundary.
    fn distance(&self, p: &Point) -> f64;
    /// Class of `p` under the family's decision rule.
    fn label(&self, p: &Point) -> Label;
}

/// Boundary family discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Hyperplane,
    Polynomial,
    Ellipse,
    Rectangle,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::Hyperplane,
        Family::Polynomial,
        Family::Ellipse,
        Family::Rectangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Family::Hyperplane => "hyperplane",
            Family::Polynomial => "polynomial",
            Family::Ellipse => "ellipse",
            Family::Rectangle => "rectangle",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hyperplane" | "linear" => Ok(Family::Hyperplane),
            "polynomial" | "poly" => Ok(Family::Polynomial),
            "ellipse" | "circle" => Ok(Family::Ellipse),
            "rectangle" | "rect" => Ok(Family::Rectangle),
            other => Err(GenError::invalid(format!("unsupported family '{other}'"))),
        }
    }
}

/// A concrete, randomly drawn decision boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Boundary {
    Hyperplane(Hyperplane),
    Polynomial(PolyCurve),
    Ellipse(Ellipse),
    Rectangle(Rect),
}

impl Boundary {
    pub fn family(&self) -> Family {
        match self {
            Boundary::Hyperplane(_) => Family::Hyperplane,
            Boundary::Polynomial(_) => Family::Polynomial,
            Boundary::Ellipse(_) => Family::Ellipse,
            Boundary::Rectangle(_) => Family::Rectangle,
        }
    }

    /// Dimension of the points this boundary separates.
    pub fn dim(&self) -> usize {
        match self {
            Boundary::Hyperplane(h) => h.dim(),
            _ => 2,
        }
    }

    /// 2D polyline tracing the boundary, for plotting.
    ///
    /// `None` for hyperplanes outside 2D. Closed shapes repeat their first vertex.
    pub fn outline(&self, scale: f64) -> Option<Vec<Vector2<f64>>> {
        match self {
            Boundary::Hyperplane(h) => h.outline(scale),
            Boundary::Polynomial(c) => Some(c.samples().to_vec()),
            Boundary::Ellipse(e) => Some(e.outline(256)),
            Boundary::Rectangle(r) => {
                let mut pts = r.corners().to_vec();
                pts.push(pts[0]);
                Some(pts)
            }
        }
    }
}

impl DecisionBoundary for Boundary {
    fn distance(&self, p: &Point) -> f64 {
        match self {
            Boundary::Hyperplane(h) => h.distance(p),
            Boundary::Polynomial(c) => c.distance(p),
            Boundary::Ellipse(e) => e.distance(p),
            Boundary::Rectangle(r) => r.distance(p),
        }
    }

    fn label(&self, p: &Point) -> Label {
        match self {
            Boundary::Hyperplane(h) => h.label(p),
            Boundary::Polynomial(c) => c.label(p),
            Boundary::Ellipse(e) => e.label(p),
            Boundary::Rectangle(r) => r.label(p),
        }
    }
}

/// Euclidean distance from `p` to the segment `[a, b]`.
pub(crate) fn point_segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[inline]
pub(crate) fn xy(p: &Point) -> Vector2<f64> {
    Vector2::new(p[0], p[1])
}
