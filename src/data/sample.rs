//! Synthetic sample generation from a known polynomial.
//!
//! Handy for trying the fitter without a dataset: x values are drawn uniformly
//! over a range and y values get additive Gaussian noise. Everything is driven
//! by a seeded `StdRng`, so the same settings always produce the same file.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Point;
use crate::error::{FitError, Result};
use crate::math::basis::{evaluate, polynomial_basis};

/// Settings for [`generate_sample`].
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// True polynomial, highest power first.
    pub coefficients: Vec<f64>,
    pub count: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the additive noise (0 for exact samples).
    pub noise: f64,
    pub seed: u64,
}

/// Draw `count` noisy samples of the configured polynomial, sorted by x.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<Point>> {
    if config.coefficients.is_empty() {
        return Err(FitError::InputValidation(
            "sample polynomial needs at least one coefficient".to_string(),
        ));
    }
    if config.count == 0 {
        return Err(FitError::InputValidation("sample count must be > 0".to_string()));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(FitError::InputValidation(format!(
            "invalid x range {}..{}",
            config.x_min, config.x_max
        )));
    }
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| FitError::InputValidation(format!("noise distribution error: {e}")))?;

    let truth = evaluate(
        &polynomial_basis(config.coefficients.len() - 1),
        &config.coefficients,
    )?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut points: Vec<Point> = (0..config.count)
        .map(|_| {
            let x = rng.gen_range(config.x_min..=config.x_max);
            Point::new(x, truth(x) + normal.sample(&mut rng))
        })
        .collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(noise: f64) -> SampleConfig {
        SampleConfig {
            coefficients: vec![5.0, -0.5, 4.0],
            count: 50,
            x_min: -2.0,
            x_max: 2.0,
            noise,
            seed: 42,
        }
    }

    #[test]
    fn noiseless_samples_lie_on_the_curve() {
        let pts = generate_sample(&config(0.0)).unwrap();
        assert_eq!(pts.len(), 50);
        for p in pts {
            assert!((-2.0..=2.0).contains(&p.x));
            assert!((p.y - (5.0 * p.x * p.x - 0.5 * p.x + 4.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn seed_makes_samples_reproducible() {
        assert_eq!(generate_sample(&config(0.3)).unwrap(), generate_sample(&config(0.3)).unwrap());
    }

    #[test]
    fn rejects_bad_settings() {
        let mut c = config(0.1);
        c.x_max = c.x_min;
        assert!(generate_sample(&c).is_err());
        let mut c = config(-1.0);
        c.count = 3;
        assert!(generate_sample(&c).is_err());
    }
}
