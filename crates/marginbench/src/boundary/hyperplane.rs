use nalgebra::{DVector, Vector2};
use rand::Rng;

use super::DecisionBoundary;
use crate::error::GenError;
use crate::label::Label;
use crate::sampler::{random_vector, Point};

const MAX_NORMAL_DRAWS: usize = 64;

/// Hyperplane `w[1..]·x + w[0] = 0`.
///
/// Invariants:
/// - `w.len() >= 2`; `w[0]` is the bias, `w[1..]` the normal.
/// - The normal is non-zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperplane {
    w: DVector<f64>,
}

impl Hyperplane {
    pub fn new(w: DVector<f64>) -> Result<Self, GenError> {
        if w.len() < 2 {
            return Err(GenError::invalid(
                "hyperplane weights need a bias and at least one normal component",
            ));
        }
        let h = Self { w };
        if !(h.normal_norm() > 0.0) {
            return Err(GenError::invalid("hyperplane normal must be non-zero"));
        }
        Ok(h)
    }

    /// Random hyperplane through the origin with normal `random_vector(dim) * scale`.
    ///
    /// A zero normal is redrawn, at most `MAX_NORMAL_DRAWS` times.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, dim: usize, scale: f64) -> Result<Self, GenError> {
        if dim == 0 {
            return Err(GenError::invalid("hyperplane dimension must be >= 1"));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(GenError::invalid("scale must be finite and > 0"));
        }
        for _ in 0..MAX_NORMAL_DRAWS {
            let normal = random_vector(rng, dim) * scale;
            if normal.norm() > 0.0 {
                let mut w = DVector::zeros(dim + 1);
                w.rows_mut(1, dim).copy_from(&normal);
                return Ok(Self { w });
            }
        }
        Err(GenError::invalid("could not draw a non-zero hyperplane normal"))
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.w
    }

    pub fn bias(&self) -> f64 {
        self.w[0]
    }

    pub fn dim(&self) -> usize {
        self.w.len() - 1
    }

    fn normal_norm(&self) -> f64 {
        self.w.rows(1, self.dim()).norm()
    }

    /// Signed activation `w[1..]·x + w[0]`.
    #[inline]
    pub fn activation(&self, p: &Point) -> f64 {
        self.w.rows(1, self.dim()).dot(p) + self.bias()
    }

    /// Line over `x ∈ [-2·scale, 2·scale]`; only defined in 2D.
    pub(super) fn outline(&self, scale: f64) -> Option<Vec<Vector2<f64>>> {
        if self.dim() != 2 {
            return None;
        }
        let (w0, w1, w2) = (self.w[0], self.w[1], self.w[2]);
        let reach = 2.0 * scale;
        if w2.abs() < 1e-12 {
            let x = -w0 / w1;
            return Some(vec![Vector2::new(x, -reach), Vector2::new(x, reach)]);
        }
        let y = |x: f64| -(w1 * x + w0) / w2;
        Some(vec![
            Vector2::new(-reach, y(-reach)),
            Vector2::new(reach, y(reach)),
        ])
    }
}

impl DecisionBoundary for Hyperplane {
    /// Perpendicular (Euclidean) distance `|w[1..]·x + w[0]| / ‖w[1..]‖`.
    fn distance(&self, p: &Point) -> f64 {
        self.activation(p).abs() / self.normal_norm()
    }

    fn label(&self, p: &Point) -> Label {
        Label::from_sign(self.activation(p) > 0.0)
    }
}
