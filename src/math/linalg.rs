//! Square linear solves and small vector helpers on top of `nalgebra`.
//!
//! The exact regime solves `A · c = Y` where `A` is the `N×N` design matrix of
//! `N` sampled points. We use a QR decomposition and back substitution on the
//! triangular factor. A diagonal entry of `R` with magnitude `<= EPSILON`
//! means the sampled points do not determine the coefficients uniquely.

use nalgebra::{DMatrix, DVector};

/// Global tolerance: magnitudes at or below this are treated as zero.
pub const EPSILON: f64 = 1.0 / 2e8;

/// Failure of a square solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// `A` is not square or `Y` has the wrong length.
    Shape { rows: usize, cols: usize, rhs: usize },
    /// A pivot of the triangular factor vanished.
    Singular { pivot: usize, value: f64 },
}

/// Solve the square system `a · c = y` via QR.
pub fn solve(a: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, SolveError> {
    let (rows, cols) = a.shape();
    if rows != cols || y.len() != rows {
        return Err(SolveError::Shape {
            rows,
            cols,
            rhs: y.len(),
        });
    }
    if rows == 0 {
        return Ok(DVector::zeros(0));
    }

    let qr = a.clone().qr();
    let r = qr.r();
    for i in 0..rows {
        let value = r[(i, i)];
        if !(value.abs() > EPSILON) {
            return Err(SolveError::Singular { pivot: i, value });
        }
    }

    // Q is orthonormal, so R c = Qᵀ y.
    let qty = qr.q().transpose() * y;
    r.solve_upper_triangular(&qty)
        .filter(|c| c.iter().all(|v| v.is_finite()))
        .ok_or(SolveError::Singular {
            pivot: rows - 1,
            value: r[(rows - 1, rows - 1)],
        })
}

/// Numerical rank: singular values above `EPSILON` scaled by the largest one.
pub fn rank(a: &DMatrix<f64>) -> usize {
    if a.is_empty() {
        return 0;
    }
    let svd = a.clone().svd(false, false);
    let max = svd.singular_values.max();
    if max <= EPSILON {
        return 0;
    }
    svd.singular_values
        .iter()
        .filter(|&&s| s > EPSILON * max.max(1.0))
        .count()
}

/// `scale * (b - a)` over equal-length slices.
pub fn scaled_difference(a: &[f64], b: &[f64], scale: f64) -> DVector<f64> {
    let a = DVector::from_column_slice(a);
    let b = DVector::from_column_slice(b);
    (b - a) * scale
}
