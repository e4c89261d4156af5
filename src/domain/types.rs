//! Shared domain types.
//!
//! Points and constraints are plain `Copy` values that serialize to/from CSV and
//! JSON. Fits carry their basis so they can be evaluated after the call returns.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::math::basis::{Basis, derivative_basis, polynomial_basis};

/// A sample `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Required derivative `dy/dx` at `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeConstraint {
    pub x: f64,
    pub slope: f64,
}

impl SlopeConstraint {
    pub fn new(x: f64, slope: f64) -> Self {
        Self { x, slope }
    }

    /// The constraint as a point against the derivative basis.
    pub fn as_point(&self) -> Point {
        Point::new(self.x, self.slope)
    }
}

/// Slope constraints plus the derivative basis they are interpreted against.
#[derive(Debug, Clone, Default)]
pub struct SlopeConstraints {
    /// Derivative basis; `None` means the derivative of the monomial basis of
    /// `FitOptions::degree`.
    pub components: Option<Basis>,
    pub slopes: Vec<SlopeConstraint>,
}

/// Configuration for one regression call.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Degree of the monomial basis used when `components` is not set.
    pub degree: usize,
    /// Explicit basis; overrides `degree`.
    pub components: Option<Basis>,
    /// Solve exactly (`true`) or refine an approximate fit (`false`).
    pub exact: bool,
    /// Points the fit must pass through.
    pub point_constraints: Vec<Point>,
    pub slope_constraints: Option<SlopeConstraints>,
    /// Refinement iterations for the approximate regime.
    pub epochs: usize,
    /// Random restarts used to seed the refinement.
    pub init_epochs: usize,
    pub learning_rate: f64,
    /// Seed for restart sampling; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            degree: 1,
            components: None,
            exact: true,
            point_constraints: Vec::new(),
            slope_constraints: None,
            epochs: 50,
            init_epochs: 5,
            learning_rate: 0.5,
            seed: None,
        }
    }
}

impl FitOptions {
    /// The primary basis: `components` if set, else the monomial basis of `degree`.
    pub fn basis(&self) -> Basis {
        self.components
            .clone()
            .unwrap_or_else(|| polynomial_basis(self.degree))
    }

    /// The derivative basis used for slope constraints, if any were given.
    ///
    /// The monomial derivative of `degree` is only a valid default while the
    /// primary basis is the monomial one; a custom `components` basis needs its
    /// derivative spelled out.
    pub fn slope_basis(&self) -> Result<Option<Basis>> {
        let Some(slopes) = &self.slope_constraints else {
            return Ok(None);
        };
        match (&slopes.components, &self.components) {
            (Some(derivative), _) => Ok(Some(derivative.clone())),
            (None, None) => Ok(Some(derivative_basis(self.degree))),
            (None, Some(_)) => Err(FitError::InvalidConstraint(
                "slope constraints on a custom basis need an explicit derivative basis".to_string(),
            )),
        }
    }

    pub fn slopes(&self) -> &[SlopeConstraint] {
        self.slope_constraints
            .as_ref()
            .map(|s| s.slopes.as_slice())
            .unwrap_or(&[])
    }
}

/// A fitted model over the full (unreduced) basis.
#[derive(Debug, Clone)]
pub struct Fit {
    /// Mean squared error over the full original point set.
    pub error: f64,
    pub coefficients: Vec<f64>,
    pub basis: Basis,
}

impl Fit {
    /// Evaluate the fitted function at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.basis.combine(&self.coefficients, x)
    }

    /// The fitted function as a standalone closure.
    pub fn evaluator(&self) -> impl Fn(f64) -> f64 + '_ {
        move |x| self.evaluate(x)
    }
}

/// Outcome of [`crate::fit::regress`].
#[derive(Debug, Clone)]
pub enum Regression {
    /// Coefficients from the exact regime.
    Exact(Vec<f64>),
    /// Refined fit from the approximate regime.
    Approximate(Fit),
}

impl Regression {
    pub fn coefficients(&self) -> &[f64] {
        match self {
            Regression::Exact(c) => c,
            Regression::Approximate(fit) => &fit.coefficients,
        }
    }
}

/// Serializable summary of a fit (for JSON export).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub degree: usize,
    pub exact: bool,
    pub coefficients: Vec<f64>,
    pub mse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub fit: FitSummary,
    pub point_constraints: Vec<Point>,
    pub slope_constraints: Vec<SlopeConstraint>,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A per-point fitted result (used for reporting and plots).
#[derive(Debug, Clone, Copy)]
pub struct PointResidual {
    pub point: Point,
    pub y_fit: f64,
    pub residual: f64,
}
