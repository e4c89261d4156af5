//! Reporting utilities: residuals and formatted terminal output.
//!
//! Formatting lives here so the fitting code stays free of presentation
//! concerns and output changes stay localized.

use crate::domain::{Fit, Point, PointResidual, SlopeConstraint};
use crate::error::{FitError, Result};
use crate::io::ingest::IngestedData;

/// Compute fitted values and residuals for each point.
pub fn compute_residuals(points: &[Point], fit: &Fit) -> Result<Vec<PointResidual>> {
    let mut out = Vec::with_capacity(points.len());
    for &point in points {
        let y_fit = fit.evaluate(point.x);
        if !y_fit.is_finite() {
            return Err(FitError::InputValidation(format!(
                "non-finite prediction at x={} during residual computation",
                point.x
            )));
        }
        out.push(PointResidual {
            point,
            y_fit,
            residual: point.y - y_fit,
        });
    }
    Ok(out)
}

/// Largest absolute residual, if any.
pub fn max_abs_residual(residuals: &[PointResidual]) -> Option<&PointResidual> {
    residuals
        .iter()
        .max_by(|a, b| a.residual.abs().total_cmp(&b.residual.abs()))
}

/// Format the run summary: dataset, regime, coefficients, error.
pub fn format_run_summary(
    ingest: &IngestedData,
    fit: &Fit,
    exact: bool,
    point_constraints: &[Point],
    slope_constraints: &[SlopeConstraint],
    residuals: &[PointResidual],
) -> String {
    let mut out = String::new();
    let stats = &ingest.stats;

    out.push_str("=== regress - constrained curve fit ===\n");
    out.push_str(&format!(
        "Points: {} used / {} rows read",
        stats.n_points, ingest.rows_read
    ));
    if !ingest.row_errors.is_empty() {
        out.push_str(&format!(" ({} skipped)", ingest.row_errors.len()));
    }
    out.push('\n');
    out.push_str(&format!(
        "Range: x=[{:.4}, {:.4}] y=[{:.4}, {:.4}]\n",
        stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));
    out.push_str(&format!(
        "Regime: {}\n",
        if exact { "exact" } else { "approximate (random restarts + descent)" }
    ));
    for p in point_constraints {
        out.push_str(&format!("Through: ({}, {})\n", p.x, p.y));
    }
    for s in slope_constraints {
        out.push_str(&format!("Slope: dy/dx({}) = {}\n", s.x, s.slope));
    }

    out.push_str("\nCoefficients (highest term first):\n");
    for (i, c) in fit.coefficients.iter().enumerate() {
        out.push_str(&format!("  c{i:<3} {c:>+.10e}\n"));
    }

    out.push_str(&format!(
        "\nMSE: {:.6e}  RMSE: {:.6e}\n",
        fit.error,
        fit.error.sqrt()
    ));
    if let Some(worst) = max_abs_residual(residuals) {
        out.push_str(&format!(
            "Worst residual: {:+.6} at x={}\n",
            worst.residual, worst.point.x
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polynomial_basis;

    #[test]
    fn residuals_and_summary() {
        let fit = Fit {
            error: 0.5,
            coefficients: vec![2.0, 1.0],
            basis: polynomial_basis(1),
        };
        let points = vec![Point::new(0.0, 1.0), Point::new(1.0, 4.0)];
        let residuals = compute_residuals(&points, &fit).unwrap();
        assert_eq!(residuals[1].y_fit, 3.0);
        assert_eq!(max_abs_residual(&residuals).unwrap().point.x, 1.0);

        let ingest = IngestedData::from_points(points.clone()).unwrap();
        let txt = format_run_summary(&ingest, &fit, true, &[Point::new(0.0, 1.0)], &[], &residuals);
        assert!(txt.contains("Points: 2 used / 2 rows read"));
        assert!(txt.contains("Regime: exact"));
        assert!(txt.contains("Through: (0, 1)"));
        assert!(txt.contains("Worst residual: +1.000000 at x=1"));
    }
}
