use nalgebra::Vector2;
use rand::Rng;

use super::{xy, DecisionBoundary};
use crate::label::Label;
use crate::sampler::{random_vector, Point};

/// Axis-aligned rectangle `[x_lo, x_hi] × [y_lo, y_hi]`.
///
/// Invariant: `x_lo <= x_hi` and `y_lo <= y_hi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x_lo: f64,
    pub x_hi: f64,
    pub y_lo: f64,
    pub y_hi: f64,
}

impl Rect {
    /// Sort four scalars `s0 <= s1 <= s2 <= s3` into `x ∈ [s0, s2]`, `y ∈ [s1, s3]`.
    pub fn from_draws(mut s: [f64; 4]) -> Self {
        s.sort_by(f64::total_cmp);
        Self {
            x_lo: s[0],
            x_hi: s[2],
            y_lo: s[1],
            y_hi: s[3],
        }
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> Self {
        let r = random_vector(rng, 4) * scale;
        Self::from_draws([r[0], r[1], r[2], r[3]])
    }

    /// Corners in drawing order: lower-left, upper-left, upper-right, lower-right.
    pub fn corners(&self) -> [Vector2<f64>; 4] {
        [
            Vector2::new(self.x_lo, self.y_lo),
            Vector2::new(self.x_lo, self.y_hi),
            Vector2::new(self.x_hi, self.y_hi),
            Vector2::new(self.x_hi, self.y_lo),
        ]
    }
}

impl DecisionBoundary for Rect {
    /// Distance to the rectangle's edges, from either side.
    fn distance(&self, p: &Point) -> f64 {
        let q = xy(p);
        let dx = (self.x_lo - q.x).max(q.x - self.x_hi);
        let dy = (self.y_lo - q.y).max(q.y - self.y_hi);
        if dx > 0.0 || dy > 0.0 {
            dx.max(0.0).hypot(dy.max(0.0))
        } else {
            -dx.max(dy)
        }
    }

    /// Positive strictly inside.
    fn label(&self, p: &Point) -> Label {
        let inside = self.x_lo < p[0] && p[0] < self.x_hi && self.y_lo < p[1] && p[1] < self.y_hi;
        Label::from_sign(inside)
    }
}
