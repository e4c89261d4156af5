//! Shared fit pipeline: options -> regression -> residuals.
//!
//! Front-ends (the CLI today) only deal with presentation; the workflow
//! ingest -> fit -> residuals lives here.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::{Fit, FitOptions, FitSummary, PointResidual, Regression};
use crate::error::Result;
use crate::fit::regress_with_rng;
use crate::io::ingest::IngestedData;
use crate::math::mean_squared_error;

/// All computed outputs of a single `regress fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub fit: Fit,
    pub residuals: Vec<PointResidual>,
    pub summary: FitSummary,
}

/// Fit `ingest.points` with `options`.
///
/// `on_fit` receives every improvement in the approximate regime.
pub fn run_fit(
    ingest: &IngestedData,
    options: &FitOptions,
    on_fit: &mut dyn FnMut(&Fit, usize),
) -> Result<RunOutput> {
    let points = &ingest.points;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let fit = match regress_with_rng(points, options, &mut rng, on_fit)? {
        Regression::Approximate(fit) => fit,
        // Exact coefficients come back bare; score them on every point.
        Regression::Exact(coefficients) => {
            let basis = options.basis();
            Fit {
                error: mean_squared_error(points, &basis, &coefficients),
                coefficients,
                basis,
            }
        }
    };

    let residuals = crate::report::compute_residuals(points, &fit)?;
    let summary = FitSummary {
        degree: options.degree,
        exact: options.exact,
        coefficients: fit.coefficients.clone(),
        mse: fit.error,
        rmse: fit.error.sqrt(),
        n: points.len(),
    };

    Ok(RunOutput {
        fit,
        residuals,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;

    #[test]
    fn exact_run_scores_all_points() {
        let ingest = IngestedData::from_points(vec![
            Point::new(0.0, 4.0),
            Point::new(3.0, 19.0),
            Point::new(4.0, 26.0),
        ])
        .unwrap();
        let run = run_fit(&ingest, &FitOptions::default(), &mut |_, _| {}).unwrap();
        // The line through the first two points misses the third by 2.
        assert!((run.fit.error - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(run.residuals.len(), 3);
        assert!((run.residuals[2].residual - 2.0).abs() < 1e-9);
    }
}
