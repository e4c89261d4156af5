//! Exact solves: as many sampled points as basis functions.
//!
//! Only the first `basis.len()` points are used. Extra points are ignored in
//! the exact regime; the approximate regime is the one that looks at all of them.

use nalgebra::{DMatrix, DVector};

use crate::domain::Point;
use crate::error::{FitError, Result};
use crate::fit::constraints::ConstraintPipeline;
use crate::math::basis::Basis;
use crate::math::linalg::{self, SolveError};

/// Solve `A · c = Y` over the first `basis.len()` points.
pub fn solve_exact(points: &[Point], basis: &Basis) -> Result<Vec<f64>> {
    let n = basis.len();
    if points.len() < n {
        return Err(FitError::MissingPoints(format!(
            "{} points supplied for {n} unknowns",
            points.len()
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    if points.len() > n {
        log::debug!(
            "exact solve uses the first {n} of {} points; the rest are ignored",
            points.len()
        );
    }

    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut y = DVector::<f64>::zeros(n);
    for (i, p) in points[..n].iter().enumerate() {
        if !p.is_finite() {
            return Err(FitError::InputValidation(format!(
                "point #{i} ({}, {}) is not finite",
                p.x, p.y
            )));
        }
        for (j, f) in basis.functions().iter().enumerate() {
            let v = f(p.x);
            if !v.is_finite() {
                return Err(FitError::InputValidation(format!(
                    "basis function #{j} is not finite at x={}",
                    p.x
                )));
            }
            a[(i, j)] = v;
        }
        y[i] = p.y;
    }

    match linalg::solve(&a, &y) {
        Ok(c) => Ok(c.iter().copied().collect()),
        Err(SolveError::Singular { pivot, value }) => Err(FitError::SingularSystem(format!(
            "design matrix has rank {} < {n} (pivot #{pivot} = {value:e}); the sampled points do not determine the coefficients",
            linalg::rank(&a)
        ))),
        Err(SolveError::Shape { rows, cols, rhs }) => Err(FitError::InputValidation(format!(
            "design matrix is {rows}x{cols} with {rhs} targets"
        ))),
    }
}

/// Exact solve on a reduced basis, expanded back through `pipeline`.
///
/// `points` must already be remapped by the pipeline.
pub fn solve_exact_resolved(
    points: &[Point],
    pipeline: &ConstraintPipeline,
) -> Result<Vec<f64>> {
    let reduced = solve_exact(points, pipeline.basis())?;
    pipeline.resolve(&reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::basis::polynomial_basis;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&p| Point::from(p)).collect()
    }

    #[test]
    fn fits_line_through_two_points() {
        let c = solve_exact(&pts(&[(0.0, 4.0), (3.0, 19.0)]), &polynomial_basis(1)).unwrap();
        assert!((c[0] - 5.0).abs() < 1e-8);
        assert!((c[1] - 4.0).abs() < 1e-8);
    }

    #[test]
    fn fits_parabola_through_three_points() {
        let c = solve_exact(
            &pts(&[(0.0, 4.0), (3.0, 47.5), (7.0, 245.5)]),
            &polynomial_basis(2),
        )
        .unwrap();
        let expected = [5.0, -0.5, 4.0];
        for (a, b) in c.iter().zip(expected) {
            assert!((a - b).abs() < 1e-8, "{c:?}");
        }
    }

    #[test]
    fn uses_only_leading_points() {
        // The third point is off the line and must be ignored.
        let c = solve_exact(
            &pts(&[(0.0, 4.0), (3.0, 19.0), (10.0, -100.0)]),
            &polynomial_basis(1),
        )
        .unwrap();
        assert!((c[0] - 5.0).abs() < 1e-8);
    }

    #[test]
    fn duplicate_x_is_singular() {
        let err = solve_exact(&pts(&[(1.0, 2.0), (1.0, 3.0)]), &polynomial_basis(1)).unwrap_err();
        assert!(matches!(err, FitError::SingularSystem(_)));
    }

    #[test]
    fn too_few_points_is_reported() {
        let err = solve_exact(&pts(&[(1.0, 2.0)]), &polynomial_basis(1)).unwrap_err();
        assert!(matches!(err, FitError::MissingPoints(_)));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let err = solve_exact(&pts(&[(1.0, f64::NAN), (2.0, 3.0)]), &polynomial_basis(1)).unwrap_err();
        assert!(matches!(err, FitError::InputValidation(_)));
    }
}
