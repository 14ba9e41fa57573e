use nalgebra::Vector2;
use rand::Rng;

use super::{xy, DecisionBoundary};
use crate::label::Label;
use crate::sampler::{random_vector, Point};

/// Axis-aligned ellipse centred at the origin with semi-axes `a` (x) and `b` (y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipse {
    a: f64,
    b: f64,
}

impl Ellipse {
    /// Negative semi-axes are meaningless; their magnitude is used.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            a: a.abs(),
            b: b.abs(),
        }
    }

    /// Semi-axes `|r0|·scale`, `|r1|·scale`; with `circle` both take `|r0|·scale`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, circle: bool, scale: f64) -> Self {
        let r = random_vector(rng, 2) * scale;
        if circle {
            Self::new(r[0], r[0])
        } else {
            Self::new(r[0], r[1])
        }
    }

    pub fn semi_axes(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    pub fn is_circle(&self) -> bool {
        self.a == self.b
    }

    pub(super) fn outline(&self, segments: usize) -> Vec<Vector2<f64>> {
        let segments = segments.max(3);
        (0..=segments)
            .map(|k| {
                let t = std::f64::consts::TAU * k as f64 / segments as f64;
                Vector2::new(self.a * t.cos(), self.b * t.sin())
            })
            .collect()
    }
}

impl DecisionBoundary for Ellipse {
    fn distance(&self, p: &Point) -> f64 {
        let q = xy(p);
        let (x, y) = (q.x.abs(), q.y.abs());
        if self.a >= self.b {
            quadrant_distance(self.a, self.b, x, y)
        } else {
            quadrant_distance(self.b, self.a, y, x)
        }
    }

    /// Positive strictly inside the ellipse.
    fn label(&self, p: &Point) -> Label {
        let (u, v) = (p[0] / self.a, p[1] / self.b);
        Label::from_sign(u * u + v * v < 1.0)
    }
}

/// Distance from `(y0, y1)` (first quadrant) to the ellipse with semi-axes `e0 >= e1 >= 0`.
///
/// Robust bisection on the Lagrange parameter (Eberly, "Distance from a Point to an Ellipse").
fn quadrant_distance(e0: f64, e1: f64, y0: f64, y1: f64) -> f64 {
    if e1 <= 0.0 {
        // Collapsed onto the segment [-e0, e0] × {0}.
        return ((y0 - e0).max(0.0)).hypot(y1);
    }
    if y1 > 0.0 {
        if y0 > 0.0 {
            let z0 = y0 / e0;
            let z1 = y1 / e1;
            let g = z0 * z0 + z1 * z1 - 1.0;
            if g == 0.0 {
                return 0.0;
            }
            let r0 = (e0 / e1) * (e0 / e1);
            let s = bisect_root(r0, z0, z1, g);
            let x0 = r0 * y0 / (s + r0);
            let x1 = y1 / (s + 1.0);
            (x0 - y0).hypot(x1 - y1)
        } else {
            (y1 - e1).abs()
        }
    } else {
        let numer0 = e0 * y0;
        let denom0 = e0 * e0 - e1 * e1;
        if numer0 < denom0 {
            let xde0 = numer0 / denom0;
            let x0 = e0 * xde0;
            let x1 = e1 * (1.0 - xde0 * xde0).max(0.0).sqrt();
            (x0 - y0).hypot(x1)
        } else {
            (y0 - e0).abs()
        }
    }
}

fn bisect_root(r0: f64, z0: f64, z1: f64, g: f64) -> f64 {
    const MAX_ITERS: usize = 1100;
    let n0 = r0 * z0;
    let mut s0 = z1 - 1.0;
    let mut s1 = if g < 0.0 { 0.0 } else { n0.hypot(z1) - 1.0 };
    let mut s = 0.0;
    for _ in 0..MAX_ITERS {
        s = 0.5 * (s0 + s1);
        if s == s0 || s == s1 {
            break;
        }
        let ratio0 = n0 / (s + r0);
        let ratio1 = z1 / (s + 1.0);
        let g = ratio0 * ratio0 + ratio1 * ratio1 - 1.0;
        if g > 0.0 {
            s0 = s;
        } else if g < 0.0 {
            s1 = s;
        } else {
            break;
        }
    }
    s
}
