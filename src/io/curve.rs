//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of a fit:
//! - coefficients, degree and error
//! - the constraints that were enforced
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, CurveGrid, Fit, FitSummary, Point, SlopeConstraint};
use crate::error::{FitError, Result};
use crate::io::ingest::DatasetStats;

/// Build the curve file for a fit over the range of `stats`.
pub fn curve_file(
    fit: &Fit,
    summary: FitSummary,
    stats: &DatasetStats,
    point_constraints: &[Point],
    slope_constraints: &[SlopeConstraint],
) -> CurveFile {
    let (x, y) = build_grid(fit, stats.x_min, stats.x_max, 101);
    CurveFile {
        tool: "regress".to_string(),
        fit: summary,
        point_constraints: point_constraints.to_vec(),
        slope_constraints: slope_constraints.to_vec(),
        grid: CurveGrid { x, y },
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        FitError::io(format!("Failed to create curve JSON '{}'", path.display()), e)
    })?;
    serde_json::to_writer_pretty(file, curve).map_err(|e| {
        FitError::json(format!("Failed to write curve JSON '{}'", path.display()), e)
    })
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile> {
    let file = File::open(path)
        .map_err(|e| FitError::io(format!("Failed to open curve JSON '{}'", path.display()), e))?;
    serde_json::from_reader(file)
        .map_err(|e| FitError::json(format!("Invalid curve JSON '{}'", path.display()), e))
}

fn build_grid(fit: &Fit, x_min: f64, x_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-9 {
        x0 -= 0.5;
        x1 += 0.5;
    }

    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x0 + u * (x1 - x0);
        xs.push(x);
        ys.push(fit.evaluate(x));
    }
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polynomial_basis;

    #[test]
    fn curve_json_round_trips_through_disk() {
        let fit = Fit {
            error: 0.0,
            coefficients: vec![5.0, 4.0],
            basis: polynomial_basis(1),
        };
        let stats = DatasetStats {
            n_points: 2,
            x_min: 0.0,
            x_max: 3.0,
            y_min: 4.0,
            y_max: 19.0,
        };
        let summary = FitSummary {
            degree: 1,
            exact: true,
            coefficients: fit.coefficients.clone(),
            mse: 0.0,
            rmse: 0.0,
            n: 2,
        };
        let curve = curve_file(&fit, summary, &stats, &[Point::new(0.0, 4.0)], &[]);
        assert_eq!(curve.grid.x.len(), 101);
        assert_eq!(curve.grid.y[100], 19.0);

        let path = std::env::temp_dir().join(format!("regress-curve-{}.json", std::process::id()));
        write_curve_json(&path, &curve).unwrap();
        let back = read_curve_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.fit.coefficients, vec![5.0, 4.0]);
        assert_eq!(back.point_constraints, vec![Point::new(0.0, 4.0)]);
    }
}
