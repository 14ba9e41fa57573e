//! Benchmark dataset generators, one per boundary family.
//!
//! Every family follows the same template:
//! 1. draw the boundary parameters from `random_vector`, scaled by `scale`;
//! 2. gate uniform draws with the boundary's distance (`draw_passing_gamma`);
//! 3. label every accepted point with the same boundary's decision rule.
//!
//! Calls share no state; reproducibility goes through `ReplayToken`.

use rand::Rng;
use serde::Serialize;

use crate::boundary::{Boundary, DecisionBoundary, Ellipse, Family, Hyperplane, PolyCurve, Rect};
use crate::error::GenError;
use crate::label::{is_degenerate, Label};
use crate::sampler::{draw_passing_gamma, Point, ReplayToken, SamplerCfg};

/// Family-specific shape parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum FamilyParams {
    Hyperplane { dim: usize },
    Polynomial { degree: usize },
    Ellipse { circle: bool },
    Rectangle,
}

impl FamilyParams {
    pub fn family(&self) -> Family {
        match self {
            FamilyParams::Hyperplane { .. } => Family::Hyperplane,
            FamilyParams::Polynomial { .. } => Family::Polynomial,
            FamilyParams::Ellipse { .. } => Family::Ellipse,
            FamilyParams::Rectangle => Family::Rectangle,
        }
    }

    /// Point dimension produced by this family.
    pub fn dim(&self) -> usize {
        match self {
            FamilyParams::Hyperplane { dim } => *dim,
            _ => 2,
        }
    }
}

/// One generation request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GenerateSpec {
    pub n: usize,
    pub gamma: f64,
    pub scale: f64,
    pub params: FamilyParams,
}

impl GenerateSpec {
    pub fn new(params: FamilyParams, n: usize, gamma: f64) -> Self {
        Self {
            n,
            gamma,
            scale: 1.0,
            params,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn validate(&self) -> Result<(), GenError> {
        validate_common(self.n, self.gamma, self.scale)?;
        if let FamilyParams::Hyperplane { dim } = self.params {
            if dim == 0 {
                return Err(GenError::invalid("hyperplane dimension must be >= 1"));
            }
        }
        Ok(())
    }
}

/// Points, their labels, and the boundary that produced both.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub points: Vec<Point>,
    pub labels: Vec<Label>,
    pub boundary: Boundary,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.boundary.dim()
    }

    pub fn family(&self) -> Family {
        self.boundary.family()
    }

    /// Single-class dataset (see `label::is_degenerate`).
    pub fn is_degenerate(&self) -> bool {
        is_degenerate(&self.labels)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point, Label)> + '_ {
        self.points.iter().zip(self.labels.iter().copied())
    }
}

/// Generate a dataset for any family.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    spec: &GenerateSpec,
    cfg: &SamplerCfg,
) -> Result<Dataset, GenError> {
    spec.validate()?;
    let GenerateSpec {
        n, gamma, scale, ..
    } = *spec;
    match spec.params {
        FamilyParams::Hyperplane { dim } => generate_linear(rng, n, gamma, dim, scale, cfg),
        FamilyParams::Polynomial { degree } => {
            generate_polynomial(rng, n, gamma, degree, scale, cfg)
        }
        FamilyParams::Ellipse { circle } => generate_ellipse(rng, n, gamma, circle, scale, cfg),
        FamilyParams::Rectangle => generate_rectangle(rng, n, gamma, scale, cfg),
    }
}

/// Generate from a replay token; equal tokens give equal datasets.
pub fn generate_replay(
    spec: &GenerateSpec,
    tok: ReplayToken,
    cfg: &SamplerCfg,
) -> Result<Dataset, GenError> {
    let mut rng = tok.to_std_rng();
    generate(&mut rng, spec, cfg)
}

/// Points in `dim` dimensions separated by a random hyperplane through the origin.
pub fn generate_linear<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    gamma: f64,
    dim: usize,
    scale: f64,
    cfg: &SamplerCfg,
) -> Result<Dataset, GenError> {
    validate_common(n, gamma, scale)?;
    if dim == 0 {
        return Err(GenError::invalid("hyperplane dimension must be >= 1"));
    }
    let plane = Hyperplane::draw(rng, dim, scale)?;
    let (points, labels) = gate_and_label(rng, n, gamma, dim, scale, &plane, cfg)?;
    Ok(Dataset {
        points,
        labels,
        boundary: Boundary::Hyperplane(plane),
    })
}

/// 2D points separated by a random polynomial curve of the given degree.
pub fn generate_polynomial<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    gamma: f64,
    degree: usize,
    scale: f64,
    cfg: &SamplerCfg,
) -> Result<Dataset, GenError> {
    validate_common(n, gamma, scale)?;
    let curve = PolyCurve::draw(rng, degree, scale);
    let (points, labels) = gate_and_label(rng, n, gamma, 2, scale, &curve, cfg)?;
    Ok(Dataset {
        points,
        labels,
        boundary: Boundary::Polynomial(curve),
    })
}

/// 2D points separated by a random origin-centred ellipse (or circle).
pub fn generate_ellipse<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    gamma: f64,
    circle: bool,
    scale: f64,
    cfg: &SamplerCfg,
) -> Result<Dataset, GenError> {
    validate_common(n, gamma, scale)?;
    let ellipse = Ellipse::draw(rng, circle, scale);
    let (points, labels) = gate_and_label(rng, n, gamma, 2, scale, &ellipse, cfg)?;
    Ok(Dataset {
        points,
        labels,
        boundary: Boundary::Ellipse(ellipse),
    })
}

/// 2D points separated by a random axis-aligned rectangle.
pub fn generate_rectangle<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    gamma: f64,
    scale: f64,
    cfg: &SamplerCfg,
) -> Result<Dataset, GenError> {
    validate_common(n, gamma, scale)?;
    let rect = Rect::draw(rng, scale);
    let (points, labels) = gate_and_label(rng, n, gamma, 2, scale, &rect, cfg)?;
    Ok(Dataset {
        points,
        labels,
        boundary: Boundary::Rectangle(rect),
    })
}

fn gate_and_label<R, B>(
    rng: &mut R,
    n: usize,
    gamma: f64,
    dim: usize,
    scale: f64,
    boundary: &B,
    cfg: &SamplerCfg,
) -> Result<(Vec<Point>, Vec<Label>), GenError>
where
    R: Rng + ?Sized,
    B: DecisionBoundary,
{
    // Every family's boundary meets the sampling box, so no point can be
    // farther from it than the box diagonal.
    let reach = 2.0 * scale * (dim as f64).sqrt();
    if gamma >= reach {
        return Err(GenError::MarginUnsatisfiable {
            gamma,
            attempts: 0,
            accepted: 0,
            requested: n,
        });
    }
    let points = draw_passing_gamma(rng, n, gamma, dim, scale, |p| boundary.distance(p), cfg)?;
    let labels = points.iter().map(|p| boundary.label(p)).collect();
    Ok((points, labels))
}

fn validate_common(n: usize, gamma: f64, scale: f64) -> Result<(), GenError> {
    if n == 0 {
        return Err(GenError::invalid("n must be > 0"));
    }
    if !gamma.is_finite() || gamma < 0.0 {
        return Err(GenError::invalid("gamma must be finite and >= 0"));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(GenError::invalid("scale must be finite and > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    fn cfg() -> SamplerCfg {
        SamplerCfg::default()
    }

    #[test]
    fn hyperplane_scenario() {
        let mut rng = StdRng::seed_from_u64(2024);
        let spec = GenerateSpec::new(FamilyParams::Hyperplane { dim: 2 }, 50, 0.01);
        let d = generate(&mut rng, &spec, &cfg()).unwrap();
        assert_eq!(d.len(), 50);
        assert_eq!(d.labels.len(), 50);
        assert_eq!(d.family(), Family::Hyperplane);
        let Boundary::Hyperplane(h) = &d.boundary else {
            panic!("expected hyperplane");
        };
        assert_eq!(h.weights().len(), 3);
        assert_eq!(h.bias(), 0.0);
        let w = h.weights();
        let norm = (w[1] * w[1] + w[2] * w[2]).sqrt();
        for (p, l) in d.iter() {
            assert_eq!(p.len(), 2);
            let act = w[1] * p[0] + w[2] * p[1] + w[0];
            assert!(act.abs() / norm > 0.01);
            assert_eq!(l, Label::from_sign(act > 0.0));
        }
    }

    #[test]
    fn polynomial_scenario() {
        let mut rng = StdRng::seed_from_u64(99);
        let spec = GenerateSpec::new(FamilyParams::Polynomial { degree: 2 }, 30, 0.05);
        let d = generate(&mut rng, &spec, &cfg()).unwrap();
        assert_eq!(d.len(), 30);
        let Boundary::Polynomial(curve) = &d.boundary else {
            panic!("expected polynomial");
        };
        assert_eq!(curve.coefficients().len(), 3);
        assert_eq!(curve.samples().len(), 2000);
        for (p, l) in d.iter() {
            let nearest_sample = curve
                .samples()
                .iter()
                .map(|s| (s.x - p[0]).hypot(s.y - p[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest_sample > 0.05);
            let fx = curve.eval(p[0]);
            assert_ne!(fx, p[1]);
            assert_eq!(l.is_positive(), p[1] > fx);
        }
    }

    #[test]
    fn high_dimensional_hyperplane() {
        let mut rng = StdRng::seed_from_u64(5);
        let d = generate_linear(&mut rng, 40, 0.05, 6, 2.0, &cfg()).unwrap();
        assert_eq!(d.dim(), 6);
        assert!(d.points.iter().all(|p| p.len() == 6));
        assert!(d.points.iter().all(|p| p.amax() <= 2.0));
    }

    #[test]
    fn circle_has_equal_axes() {
        let mut rng = StdRng::seed_from_u64(8);
        let d = generate_ellipse(&mut rng, 10, 0.0, true, 1.0, &cfg()).unwrap();
        let Boundary::Ellipse(e) = d.boundary else {
            panic!("expected ellipse");
        };
        assert!(e.is_circle());
    }

    #[test]
    fn rejects_invalid_arguments() {
        let mut rng = StdRng::seed_from_u64(0);
        let bad = [
            GenerateSpec::new(FamilyParams::Rectangle, 0, 0.1),
            GenerateSpec::new(FamilyParams::Rectangle, 10, -0.1),
            GenerateSpec::new(FamilyParams::Rectangle, 10, f64::NAN),
            GenerateSpec::new(FamilyParams::Rectangle, 10, 0.1).with_scale(0.0),
            GenerateSpec::new(FamilyParams::Hyperplane { dim: 0 }, 10, 0.1),
        ];
        for spec in bad {
            assert!(matches!(
                generate(&mut rng, &spec, &cfg()),
                Err(GenError::InvalidArgument { .. })
            ));
        }
        assert!("hexagon".parse::<Family>().is_err());
    }

    #[test]
    fn unreachable_margin_is_reported() {
        let mut rng = StdRng::seed_from_u64(0);
        let spec = GenerateSpec::new(FamilyParams::Hyperplane { dim: 2 }, 5, 10.0);
        let small = SamplerCfg {
            max_attempts_per_point: 200,
        };
        assert!(matches!(
            generate(&mut rng, &spec, &small),
            Err(GenError::MarginUnsatisfiable { requested: 5, .. })
        ));
    }

    #[test]
    fn margin_beyond_box_diagonal_fails_without_sampling() {
        let spec = GenerateSpec::new(FamilyParams::Polynomial { degree: 2 }, 20, 50.0);
        let started = Instant::now();
        let err = generate_replay(&spec, ReplayToken { seed: 0, index: 0 }, &cfg()).unwrap_err();
        assert_eq!(
            err,
            GenError::MarginUnsatisfiable {
                gamma: 50.0,
                attempts: 0,
                accepted: 0,
                requested: 20,
            }
        );
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn unreachable_polynomial_margin_fails_after_one_streak() {
        // The curve passes through the origin, so no point of the unit box is
        // farther than sqrt(2) from it; 2.0 is below the diagonal check.
        let spec = GenerateSpec::new(FamilyParams::Polynomial { degree: 2 }, 20, 2.0);
        let small = SamplerCfg {
            max_attempts_per_point: 2_000,
        };
        let started = Instant::now();
        let err = generate_replay(&spec, ReplayToken { seed: 1, index: 0 }, &small).unwrap_err();
        assert_eq!(
            err,
            GenError::MarginUnsatisfiable {
                gamma: 2.0,
                attempts: 2_000,
                accepted: 0,
                requested: 20,
            }
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn replay_reproduces_dataset() {
        let spec = GenerateSpec::new(FamilyParams::Ellipse { circle: false }, 25, 0.02);
        let tok = ReplayToken { seed: 11, index: 4 };
        let a = generate_replay(&spec, tok, &cfg()).unwrap();
        let b = generate_replay(&spec, tok, &cfg()).unwrap();
        assert_eq!(a.points, b.points);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.boundary, b.boundary);
    }

    #[test]
    fn small_margin_yields_both_classes_usually() {
        let spec = GenerateSpec::new(FamilyParams::Hyperplane { dim: 2 }, 50, 0.01);
        let diverse = (0..40)
            .filter(|&i| {
                let tok = ReplayToken { seed: 3, index: i };
                !generate_replay(&spec, tok, &cfg()).unwrap().is_degenerate()
            })
            .count();
        assert!(diverse >= 36, "only {diverse}/40 diverse");
    }

    fn any_params() -> impl Strategy<Value = FamilyParams> {
        prop_oneof![
            (1usize..5).prop_map(|dim| FamilyParams::Hyperplane { dim }),
            (0usize..5).prop_map(|degree| FamilyParams::Polynomial { degree }),
            any::<bool>().prop_map(|circle| FamilyParams::Ellipse { circle }),
            Just(FamilyParams::Rectangle),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn margin_count_and_labels_hold(
            params in any_params(),
            n in 1usize..40,
            gamma in 0.0f64..0.05,
            scale in 0.5f64..3.0,
            seed in any::<u64>(),
        ) {
            let spec = GenerateSpec::new(params, n, gamma).with_scale(scale);
            let d = generate_replay(&spec, ReplayToken { seed, index: 0 }, &cfg()).unwrap();
            prop_assert_eq!(d.points.len(), n);
            prop_assert_eq!(d.labels.len(), n);
            prop_assert_eq!(d.family(), params.family());
            for (p, l) in d.iter() {
                prop_assert_eq!(p.len(), params.dim());
                prop_assert!(d.boundary.distance(p) > gamma);
                prop_assert_eq!(d.boundary.label(p), l);
            }
        }
    }
}
