//! Chaining slope and point eliminations into one reduced system.
//!
//! Slope constraints are eliminated first, on the derivative basis. Each one
//! folds the primary basis by the same `K` over its derivative-aligned prefix,
//! leaving trailing terms (the constant) alone. Point constraints are then
//! eliminated on whatever primary basis is left.
//!
//! Every constraint is remapped through all earlier steps before its own
//! elimination, so it is expressed against the basis it actually reduces.
//! Remapping replays the step records forward; coefficient reconstruction
//! replays them last-in first-out.

use crate::domain::{Point, SlopeConstraint};
use crate::error::{FitError, Result};
use crate::fit::reduce::{EliminationStep, elimination_step};
use crate::math::basis::Basis;

/// A basis reduced by a set of exact constraints.
#[derive(Debug, Clone)]
pub struct ConstraintPipeline {
    primary_len: usize,
    /// Primary functions with no derivative counterpart (passed through on resolve).
    tail_len: usize,
    slope_steps: Vec<EliminationStep>,
    point_steps: Vec<EliminationStep>,
    basis: Basis,
}

impl ConstraintPipeline {
    /// A pipeline that eliminates nothing.
    pub fn unconstrained(primary: &Basis) -> Self {
        Self {
            primary_len: primary.len(),
            tail_len: 0,
            slope_steps: Vec::new(),
            point_steps: Vec::new(),
            basis: primary.clone(),
        }
    }

    /// Eliminate `slopes` (against `derivative`) and then `points` from `primary`.
    pub fn build(
        primary: &Basis,
        points: &[Point],
        derivative: Option<&Basis>,
        slopes: &[SlopeConstraint],
    ) -> Result<Self> {
        let mut pipeline = Self::unconstrained(primary);

        if !slopes.is_empty() {
            let Some(derivative) = derivative else {
                return Err(FitError::InvalidConstraint(
                    "slope constraints need a derivative basis".to_string(),
                ));
            };
            pipeline.eliminate_slopes(derivative, slopes)?;
        }
        pipeline.eliminate_points(points)?;

        log::debug!(
            "reduced basis from {} to {} functions ({} slope, {} point constraints)",
            pipeline.primary_len,
            pipeline.basis.len(),
            pipeline.slope_steps.len(),
            pipeline.point_steps.len()
        );
        Ok(pipeline)
    }

    fn eliminate_slopes(&mut self, derivative: &Basis, slopes: &[SlopeConstraint]) -> Result<()> {
        if derivative.len() > self.basis.len() {
            return Err(FitError::InvalidConstraint(format!(
                "derivative basis has {} functions but the primary basis only {}",
                derivative.len(),
                self.basis.len()
            )));
        }
        if slopes.len() > derivative.len() {
            return Err(FitError::OverdeterminedConstraint(format!(
                "{} slope constraints for {} derivative terms",
                slopes.len(),
                derivative.len()
            )));
        }
        self.tail_len = self.basis.len() - derivative.len();

        let mut derivative = derivative.clone();
        let mut derivative_steps: Vec<EliminationStep> = Vec::with_capacity(slopes.len());

        for (j, slope) in slopes.iter().enumerate() {
            let ctx = || format!("slope constraint #{} at x={}", j + 1, slope.x);
            if !(slope.x.is_finite() && slope.slope.is_finite()) {
                return Err(FitError::InvalidConstraint(format!(
                    "({}, {}) is not finite",
                    slope.x, slope.slope
                ))
                .context(ctx()));
            }

            let target = derivative_steps
                .iter()
                .fold(slope.as_point(), |p, step| step.remap_point(p));
            let step = elimination_step(&derivative, target).map_err(|e| e.context(ctx()))?;

            let pivot = step.k().len();
            let primary_step = step.with_eliminated(self.basis.functions()[pivot].clone());

            derivative = step.fold(&derivative);
            self.basis = primary_step.fold(&self.basis);
            derivative_steps.push(step);
            self.slope_steps.push(primary_step);
        }
        Ok(())
    }

    fn eliminate_points(&mut self, points: &[Point]) -> Result<()> {
        if points.len() > self.basis.len() {
            return Err(FitError::OverdeterminedConstraint(format!(
                "{} point constraints for {} free coefficients",
                points.len(),
                self.basis.len()
            )));
        }

        for (j, &point) in points.iter().enumerate() {
            let ctx = || format!("point constraint #{} at x={}", j + 1, point.x);
            if !point.is_finite() {
                return Err(FitError::InvalidConstraint(format!(
                    "({}, {}) is not finite",
                    point.x, point.y
                ))
                .context(ctx()));
            }

            let target = self.remap_point(point);
            let step = elimination_step(&self.basis, target).map_err(|e| e.context(ctx()))?;
            self.basis = step.fold(&self.basis);
            self.point_steps.push(step);
        }
        Ok(())
    }

    /// The fully reduced basis.
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Size of the original primary basis.
    pub fn primary_len(&self) -> usize {
        self.primary_len
    }

    /// Number of eliminated dimensions.
    pub fn eliminated(&self) -> usize {
        self.slope_steps.len() + self.point_steps.len()
    }

    pub fn is_constrained(&self) -> bool {
        self.eliminated() > 0
    }

    /// True when the constraints alone determine every coefficient.
    pub fn is_resolved(&self) -> bool {
        self.basis.is_empty()
    }

    pub fn slope_steps(&self) -> &[EliminationStep] {
        &self.slope_steps
    }

    pub fn point_steps(&self) -> &[EliminationStep] {
        &self.point_steps
    }

    fn remap_point(&self, p: Point) -> Point {
        self.slope_steps
            .iter()
            .chain(&self.point_steps)
            .fold(p, |p, step| step.remap_point(p))
    }

    /// Express `points` against the reduced basis.
    pub fn remap(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.remap_point(p)).collect()
    }

    /// Expand coefficients of the reduced basis to the full primary basis.
    pub fn resolve(&self, reduced: &[f64]) -> Result<Vec<f64>> {
        if reduced.len() != self.basis.len() {
            return Err(FitError::InputValidation(format!(
                "expected {} reduced coefficients, got {}",
                self.basis.len(),
                reduced.len()
            )));
        }

        let mut coefficients = reduced.to_vec();
        for step in self.point_steps.iter().rev() {
            coefficients = step.resolve(&coefficients)?;
        }

        let tail = coefficients.split_off(coefficients.len() - self.tail_len);
        for step in self.slope_steps.iter().rev() {
            coefficients = step.resolve(&coefficients)?;
        }
        coefficients.extend(tail);
        Ok(coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::exact::solve_exact;
    use crate::math::basis::{derivative_basis, polynomial_basis};

    fn parabola(x: f64) -> f64 {
        5.0 * x * x - 0.5 * x + 4.0
    }

    fn samples(xs: &[f64]) -> Vec<Point> {
        xs.iter().map(|&x| Point::new(x, parabola(x))).collect()
    }

    fn assert_coefficients(got: &[f64], expected: &[f64]) {
        assert_eq!(got.len(), expected.len(), "{got:?}");
        for (a, b) in got.iter().zip(expected) {
            assert!((a - b).abs() < 1e-8, "{got:?} vs {expected:?}");
        }
    }

    #[test]
    fn unconstrained_pipeline_is_identity() {
        let p = ConstraintPipeline::build(&polynomial_basis(2), &[], None, &[]).unwrap();
        assert!(!p.is_constrained());
        assert_eq!(p.resolve(&[1.0, 2.0, 3.0]).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn point_constraints_compose_in_order() {
        let basis = polynomial_basis(2);
        let constraints = samples(&[1.0, 2.0]);
        let p = ConstraintPipeline::build(&basis, &constraints, None, &[]).unwrap();
        assert_eq!(p.basis().len(), 1);

        let remapped = p.remap(&samples(&[5.0]));
        let reduced = solve_exact(&remapped, p.basis()).unwrap();
        assert_coefficients(&p.resolve(&reduced).unwrap(), &[5.0, -0.5, 4.0]);
    }

    #[test]
    fn constraints_equal_to_basis_size_resolve_without_solve() {
        let basis = polynomial_basis(1);
        let constraints = vec![Point::new(0.0, 4.0), Point::new(3.0, 19.0)];
        let p = ConstraintPipeline::build(&basis, &constraints, None, &[]).unwrap();
        assert!(p.is_resolved());
        assert_coefficients(&p.resolve(&[]).unwrap(), &[5.0, 4.0]);
    }

    #[test]
    fn slope_constraint_folds_primary_basis() {
        // d/dx (5x² - 0.5x + 4) at x = 1 is 9.5.
        let p = ConstraintPipeline::build(
            &polynomial_basis(2),
            &[],
            Some(&derivative_basis(2)),
            &[SlopeConstraint::new(1.0, 9.5)],
        )
        .unwrap();
        assert_eq!(p.basis().len(), 2);
        assert_eq!(p.slope_steps()[0].k(), &[-2.0]);

        let remapped = p.remap(&samples(&[0.0, 3.0]));
        let reduced = solve_exact(&remapped, p.basis()).unwrap();
        assert_coefficients(&p.resolve(&reduced).unwrap(), &[5.0, -0.5, 4.0]);
    }

    #[test]
    fn slope_and_point_fully_determine_a_line() {
        let p = ConstraintPipeline::build(
            &polynomial_basis(1),
            &[Point::new(0.0, 4.0)],
            Some(&derivative_basis(1)),
            &[SlopeConstraint::new(7.0, 5.0)],
        )
        .unwrap();
        assert!(p.is_resolved());
        assert_coefficients(&p.resolve(&[]).unwrap(), &[5.0, 4.0]);
    }

    #[test]
    fn two_slopes_and_a_point_fix_a_cubic() {
        // y = x³ - 2x² + 3x - 1, y' = 3x² - 4x + 3
        let f = |x: f64| x * x * x - 2.0 * x * x + 3.0 * x - 1.0;
        let df = |x: f64| 3.0 * x * x - 4.0 * x + 3.0;
        let p = ConstraintPipeline::build(
            &polynomial_basis(3),
            &[Point::new(2.0, f(2.0))],
            Some(&derivative_basis(3)),
            &[SlopeConstraint::new(1.0, df(1.0)), SlopeConstraint::new(-1.0, df(-1.0))],
        )
        .unwrap();
        assert_eq!(p.basis().len(), 1);

        let remapped = p.remap(&[Point::new(0.5, f(0.5))]);
        let reduced = solve_exact(&remapped, p.basis()).unwrap();
        assert_coefficients(&p.resolve(&reduced).unwrap(), &[1.0, -2.0, 3.0, -1.0]);
    }

    #[test]
    fn too_many_point_constraints_are_overdetermined() {
        for degree in 1..6 {
            let constraints: Vec<Point> = (0..degree + 2).map(|i| Point::new(i as f64, 1.0)).collect();
            let err = ConstraintPipeline::build(&polynomial_basis(degree), &constraints, None, &[])
                .unwrap_err();
            assert!(matches!(err, FitError::OverdeterminedConstraint(_)), "degree {degree}");
        }
    }

    #[test]
    fn malformed_constraints_are_rejected() {
        let err = ConstraintPipeline::build(
            &polynomial_basis(2),
            &[Point::new(f64::NAN, 1.0)],
            None,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, FitError::InvalidConstraint(_)));

        let err = ConstraintPipeline::build(
            &polynomial_basis(1),
            &[],
            Some(&derivative_basis(3)),
            &[SlopeConstraint::new(0.0, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, FitError::InvalidConstraint(_)));
    }

    #[test]
    fn degenerate_point_constraint_carries_context() {
        // The constant is eliminated first and never vanishes, but the second
        // constraint lands on the `x` pivot at the origin.
        let err = ConstraintPipeline::build(
            &polynomial_basis(1),
            &[Point::new(0.0, 1.0), Point::new(0.0, 1.0)],
            None,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, FitError::UnstableSystem(_)));
        assert!(err.to_string().contains("point constraint #2"), "{err}");
    }
}
