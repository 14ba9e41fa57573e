use nalgebra::Vector2;
use rand::Rng;

use super::{point_segment_distance, xy, DecisionBoundary};
use crate::label::Label;
use crate::sampler::{random_vector, Point};

/// Curve samples on each side of the origin.
pub const CURVE_SAMPLES_PER_SIDE: i64 = 1000;

/// Polynomial curve `y = f(x)` through the origin, discretized for distance queries.
///
/// `f(x) = Σ_{a < degree} (coeffs[a] · x)^(degree − a)`; the trailing constant
/// `coeffs[degree]` is always 0, which pins the curve to the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct PolyCurve {
    coeffs: Vec<f64>,
    samples: Vec<Vector2<f64>>,
}

impl PolyCurve {
    /// Build from the `degree` leading coefficients; samples cover
    /// `x = j · scale / 1000` for `j ∈ [-1000, 1000)`.
    pub fn new(leading: &[f64], scale: f64) -> Self {
        let mut coeffs = leading.to_vec();
        coeffs.push(0.0);
        let mut curve = Self {
            coeffs,
            samples: Vec::new(),
        };
        let k = scale / CURVE_SAMPLES_PER_SIDE as f64;
        let samples = (-CURVE_SAMPLES_PER_SIDE..CURVE_SAMPLES_PER_SIDE)
            .map(|j| {
                let x = j as f64 * k;
                Vector2::new(x, curve.eval(x))
            })
            .collect();
        curve.samples = samples;
        curve
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R, degree: usize, scale: f64) -> Self {
        let leading = random_vector(rng, degree) * scale;
        Self::new(leading.as_slice(), scale)
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// All `degree + 1` coefficients, trailing zero included.
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn samples(&self) -> &[Vector2<f64>] {
        &self.samples
    }

    pub fn eval(&self, x: f64) -> f64 {
        let degree = self.degree();
        self.coeffs[..degree]
            .iter()
            .enumerate()
            .map(|(a, b)| (b * x).powi((degree - a) as i32))
            .sum()
    }
}

impl DecisionBoundary for PolyCurve {
    /// Distance to the nearest segment of the sampled polyline.
    fn distance(&self, p: &Point) -> f64 {
        let q = xy(p);
        self.samples
            .windows(2)
            .map(|s| point_segment_distance(q, s[0], s[1]))
            .fold(f64::INFINITY, f64::min)
    }

    /// Positive above the curve, negative on or below it.
    fn label(&self, p: &Point) -> Label {
        Label::from_sign(self.eval(p[0]) < p[1])
    }
}
