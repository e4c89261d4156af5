//! Entry point: dispatch to the exact or the approximate regime.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Fit, FitOptions, Point, Regression};
use crate::error::Result;
use crate::fit::constraints::ConstraintPipeline;
use crate::fit::descent::fit_approximate;
use crate::fit::exact::solve_exact_resolved;

/// Fit `points` according to `options`.
///
/// The approximate regime draws from `StdRng::seed_from_u64(seed)` when a seed
/// is configured and from OS entropy otherwise.
pub fn regress(points: &[Point], options: &FitOptions) -> Result<Regression> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    regress_with_rng(points, options, &mut rng, &mut |_, _| {})
}

/// [`regress`] with an explicit random source and an improvement callback.
///
/// The callback only fires in the approximate regime.
pub fn regress_with_rng<R: Rng + ?Sized>(
    points: &[Point],
    options: &FitOptions,
    rng: &mut R,
    on_fit: &mut dyn FnMut(&Fit, usize),
) -> Result<Regression> {
    if options.exact {
        fit_exact(points, options).map(Regression::Exact)
    } else {
        fit_approximate(points, options, rng, on_fit).map(Regression::Approximate)
    }
}

/// Exact regime: reduce by the constraints, then solve on the leading points.
pub fn fit_exact(points: &[Point], options: &FitOptions) -> Result<Vec<f64>> {
    let primary = options.basis();
    let slope_basis = options
        .slope_basis()
        .map_err(|e| e.context("constraint reduction"))?;
    let pipeline = ConstraintPipeline::build(
        &primary,
        &options.point_constraints,
        slope_basis.as_ref(),
        options.slopes(),
    )
    .map_err(|e| e.context("constraint reduction"))?;

    let remapped = pipeline.remap(points);
    solve_exact_resolved(&remapped, &pipeline).map_err(|e| e.context("exact fit"))
}
