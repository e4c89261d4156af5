//! Approximate least-squares fitting for over-determined systems.
//!
//! The optimizer works on the constraint-reduced basis:
//!
//! 1. exact-solve `init_epochs` random samples, one point drawn from each
//!    percentile zone of the x-sorted data, and keep the two best fits;
//! 2. repeatedly step from the best fit along (or against) the direction of the
//!    second best, with a learning rate that decays on failure and resets on
//!    success;
//! 3. expand the winner back to the full basis.
//!
//! Residuals are invariant under constraint remapping, so the MSE computed on
//! remapped points equals the MSE of the expanded fit on the original points.

use nalgebra::DVector;
use rand::Rng;

use crate::domain::{Fit, FitOptions, Point};
use crate::error::{FitError, Result};
use crate::fit::constraints::ConstraintPipeline;
use crate::fit::exact::solve_exact;
use crate::math::basis::Basis;
use crate::math::linalg::{EPSILON, scaled_difference};
use crate::math::stats::{mean_squared_error, percentile_zones, sort_by_x};

/// Scale applied to the best restart when no second distinct fit exists.
const FALLBACK_SCALE: f64 = 1.05;

#[derive(Debug, Clone)]
struct Candidate {
    coefficients: Vec<f64>,
    error: f64,
}

/// Fit `points` approximately, honoring the constraints in `options`.
///
/// `on_fit` is called with the best restart (epoch 0) and after every strict
/// improvement (1-based epoch index).
pub fn fit_approximate<R: Rng + ?Sized>(
    points: &[Point],
    options: &FitOptions,
    rng: &mut R,
    on_fit: &mut dyn FnMut(&Fit, usize),
) -> Result<Fit> {
    validate(points, options)?;

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

    if pipeline.is_resolved() {
        let coefficients = pipeline.resolve(&[])?;
        let error = mean_squared_error(points, &primary, &coefficients);
        log::debug!("constraints determine every coefficient; skipping refinement");
        return Ok(Fit {
            error,
            coefficients,
            basis: primary,
        });
    }

    let size = pipeline.basis().len();
    if points.len() < size {
        return Err(FitError::MissingPoints(format!(
            "{} points supplied for {size} free coefficients",
            points.len()
        )));
    }

    let descent = Descent {
        points: pipeline.remap(points),
        basis: pipeline.basis(),
        pipeline: &pipeline,
        primary: &primary,
    };

    let (mut best, mut second) = descent
        .random_restarts(options.init_epochs, rng)
        .map_err(|e| e.context("random restart initialization"))?;
    on_fit(&descent.expand(&best)?, 0);

    let initial_rate = options.learning_rate;
    let mut rate = initial_rate;
    for epoch in 1..=options.epochs {
        let delta = scaled_difference(&best.coefficients, &second.coefficients, rate);
        if delta.norm() <= EPSILON {
            log::debug!("epoch {epoch}: step vanished, stopping");
            break;
        }

        let chosen = descent.propose(&best, &delta);
        if chosen.error < best.error {
            log::trace!("epoch {epoch}: mse {:e} -> {:e}", best.error, chosen.error);
            second = std::mem::replace(&mut best, chosen);
            on_fit(&descent.expand(&best)?, epoch);
            rate = initial_rate;
        } else {
            rate = decay_learning_rate(rate);
            log::trace!("epoch {epoch}: no improvement, learning rate {rate}");
            if chosen.error < second.error {
                second = chosen;
            }
        }
    }

    descent.expand(&best)
}

fn validate(points: &[Point], options: &FitOptions) -> Result<()> {
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(FitError::InputValidation(format!(
            "point #{i} ({}, {}) is not finite",
            points[i].x, points[i].y
        )));
    }
    if points.is_empty() {
        return Err(FitError::MissingPoints(
            "at least one point is needed to score a fit".to_string(),
        ));
    }
    if options.init_epochs == 0 {
        return Err(FitError::InputValidation(
            "init_epochs must be at least 1".to_string(),
        ));
    }
    if !(options.learning_rate.is_finite() && options.learning_rate > 0.0) {
        return Err(FitError::InputValidation(format!(
            "learning rate must be positive, got {}",
            options.learning_rate
        )));
    }
    Ok(())
}

/// One decay step: `-0.1` above 0.2, `-0.05` above 0.05, `-0.01` above 0.01,
/// rounded to two decimals. Rates at or below 0.01 stay put.
pub fn decay_learning_rate(rate: f64) -> f64 {
    let next = if rate > 0.2 {
        rate - 0.1
    } else if rate > 0.05 {
        rate - 0.05
    } else if rate > 0.01 {
        rate - 0.01
    } else {
        rate
    };
    (next * 100.0).round() / 100.0
}

struct Descent<'a> {
    /// Remapped points, in input order.
    points: Vec<Point>,
    basis: &'a Basis,
    pipeline: &'a ConstraintPipeline,
    primary: &'a Basis,
}

impl Descent<'_> {
    fn score(&self, coefficients: &[f64]) -> Candidate {
        Candidate {
            error: mean_squared_error(&self.points, self.basis, coefficients),
            coefficients: coefficients.to_vec(),
        }
    }

    /// Step from `best` along `delta`; the opposite direction is only tried
    /// when the forward step is worse than `best`.
    fn propose(&self, best: &Candidate, delta: &DVector<f64>) -> Candidate {
        let origin = DVector::from_column_slice(&best.coefficients);
        let forward = self.score((&origin + delta).as_slice());
        if forward.error <= best.error {
            return forward;
        }
        let backward = self.score((&origin - delta).as_slice());
        if backward.error < forward.error {
            backward
        } else {
            forward
        }
    }

    fn expand(&self, candidate: &Candidate) -> Result<Fit> {
        Ok(Fit {
            error: candidate.error,
            coefficients: self.pipeline.resolve(&candidate.coefficients)?,
            basis: self.primary.clone(),
        })
    }

    /// Best and second-best exact fits over random percentile-zone samples.
    fn random_restarts<R: Rng + ?Sized>(
        &self,
        restarts: usize,
        rng: &mut R,
    ) -> Result<(Candidate, Candidate)> {
        let sorted = sort_by_x(&self.points);
        let zones = percentile_zones(sorted.len(), self.basis.len());

        let mut best: Option<Candidate> = None;
        let mut second: Option<Candidate> = None;

        for restart in 0..restarts {
            let sample: Vec<Point> = zones
                .iter()
                .map(|zone| sorted[rng.gen_range(zone.clone())])
                .collect();
            let coefficients = match solve_exact(&sample, self.basis) {
                Ok(c) => c,
                Err(FitError::SingularSystem(msg)) => {
                    log::debug!("restart {restart}: skipped singular sample ({msg})");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let candidate = self.score(&coefficients);

            if best
                .as_ref()
                .is_some_and(|b| same_coefficients(&b.coefficients, &candidate.coefficients))
            {
                continue;
            }
            if best.as_ref().is_none_or(|b| candidate.error < b.error) {
                second = best.replace(candidate);
            } else if second.as_ref().is_none_or(|s| candidate.error < s.error) {
                second = Some(candidate);
            }
        }

        let Some(best) = best else {
            return Err(FitError::SingularSystem(format!(
                "none of {restarts} random samples produced a solvable system"
            )));
        };
        let second = match second {
            Some(s) => s,
            None => {
                log::debug!("only one distinct restart fit; scaling it by {FALLBACK_SCALE}");
                let scaled: Vec<f64> = best.coefficients.iter().map(|c| c * FALLBACK_SCALE).collect();
                self.score(&scaled)
            }
        };
        Ok((best, second))
    }
}

fn same_coefficients(a: &[f64], b: &[f64]) -> bool {
    scaled_difference(a, b, 1.0).norm() <= EPSILON
}
