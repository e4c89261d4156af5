//! Basis functions for linear-in-coefficients models.
//!
//! A model is `f(x) = Σ c_i φ_i(x)` where the `φ_i` form an ordered [`Basis`].
//! Position in the basis is the coefficient index.
//!
//! The canonical polynomial basis is ordered from the highest power down to the
//! constant term, which always sits last:
//!
//! ```text
//! degree 2:   [x², x, 1]
//! derivative: [2x, 1]
//! ```
//!
//! Keeping the constant last matters for constraint elimination: slope
//! constraints fold everything except the trailing constant.

use std::fmt;
use std::sync::Arc;

use crate::error::{FitError, Result};

/// A single basis function `f64 -> f64`.
pub type BasisFunction = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// An ordered sequence of basis functions.
#[derive(Clone, Default)]
pub struct Basis {
    functions: Vec<BasisFunction>,
}

impl Basis {
    pub fn new(functions: Vec<BasisFunction>) -> Self {
        Self { functions }
    }

    /// Build a basis from plain closures.
    pub fn from_fns<F>(functions: Vec<F>) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            functions: functions
                .into_iter()
                .map(|f| Arc::new(f) as BasisFunction)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&BasisFunction> {
        self.functions.get(i)
    }

    pub fn functions(&self) -> &[BasisFunction] {
        &self.functions
    }

    /// Evaluate every basis function at `x` (one design-matrix row).
    pub fn eval_row(&self, x: f64) -> Vec<f64> {
        self.functions.iter().map(|f| f(x)).collect()
    }

    /// `Σ c_i φ_i(x)` without length checks; callers guarantee matching sizes.
    pub(crate) fn combine(&self, coefficients: &[f64], x: f64) -> f64 {
        self.functions
            .iter()
            .zip(coefficients)
            .map(|(f, c)| c * f(x))
            .sum()
    }
}

impl fmt::Debug for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Basis")
            .field("len", &self.functions.len())
            .finish()
    }
}

/// Monomial basis of the given degree: `[x^d, ..., x, 1]`.
pub fn polynomial_basis(degree: usize) -> Basis {
    let functions = (0..=degree)
        .rev()
        .map(|power| -> BasisFunction {
            match power {
                0 => Arc::new(|_x: f64| 1.0),
                1 => Arc::new(|x: f64| x),
                p => {
                    let p = p as i32;
                    Arc::new(move |x: f64| x.powi(p))
                }
            }
        })
        .collect();
    Basis::new(functions)
}

/// First derivative of [`polynomial_basis`]: `[d x^(d-1), ..., 2x, 1]`.
///
/// The constant term differentiates to zero and is omitted, so the result has
/// `degree` functions aligned with the non-constant prefix of the primary basis.
pub fn derivative_basis(degree: usize) -> Basis {
    let functions = (1..=degree)
        .rev()
        .map(|power| -> BasisFunction {
            match power {
                1 => Arc::new(|_x: f64| 1.0),
                p => {
                    let scale = p as f64;
                    let p = (p - 1) as i32;
                    Arc::new(move |x: f64| scale * x.powi(p))
                }
            }
        })
        .collect();
    Basis::new(functions)
}

/// Return the evaluator `x -> Σ coefficients[i] * basis[i](x)`.
pub fn evaluate(basis: &Basis, coefficients: &[f64]) -> Result<impl Fn(f64) -> f64 + use<>> {
    if coefficients.len() != basis.len() {
        return Err(FitError::InputValidation(format!(
            "expected {} coefficients for the basis, got {}",
            basis.len(),
            coefficients.len()
        )));
    }
    let basis = basis.clone();
    let coefficients = coefficients.to_vec();
    Ok(move |x: f64| basis.combine(&coefficients, x))
}
