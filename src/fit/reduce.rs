//! Single-step constraint elimination.
//!
//! An exact constraint `f(x0) = y0` on `f = Σ c_i φ_i` pins the last coefficient:
//!
//! ```text
//! c_last = y0 / φ_last(x0) - Σ_{i<last} c_i φ_i(x0) / φ_last(x0)
//!        = newY + Σ K_i c_i
//! ```
//!
//! Substituting back gives a basis one element shorter,
//! `φ'_i = φ_i + K_i φ_last`, and shifts every observation by the part of the
//! model that is now fully known, `newY φ_last(x)`.
//!
//! Each elimination is recorded as an [`EliminationStep`]. Chains of steps are
//! replayed forward to remap points and in reverse to rebuild coefficients.

use std::sync::Arc;

use crate::domain::Point;
use crate::error::{FitError, Result};
use crate::math::basis::{Basis, BasisFunction};
use crate::math::linalg::EPSILON;

/// One eliminated basis dimension.
#[derive(Clone)]
pub struct EliminationStep {
    k: Vec<f64>,
    new_y: f64,
    eliminated: BasisFunction,
}

impl std::fmt::Debug for EliminationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EliminationStep")
            .field("k", &self.k)
            .field("new_y", &self.new_y)
            .finish()
    }
}

impl EliminationStep {
    /// Fold coefficients `K_i = -φ_i(x) / φ_last(x)`.
    pub fn k(&self) -> &[f64] {
        &self.k
    }

    /// `y / φ_last(x)`: the eliminated coefficient when every other one is zero.
    pub fn new_y(&self) -> f64 {
        self.new_y
    }

    /// Size of the basis this step expands back to.
    pub fn full_len(&self) -> usize {
        self.k.len() + 1
    }

    /// The same fold applied to a different basis whose function at the pivot
    /// is `eliminated`.
    pub(crate) fn with_eliminated(&self, eliminated: BasisFunction) -> Self {
        Self {
            k: self.k.clone(),
            new_y: self.new_y,
            eliminated,
        }
    }

    /// Subtract the known part of the model from one point.
    pub fn remap_point(&self, p: Point) -> Point {
        Point::new(p.x, p.y - self.new_y * (self.eliminated)(p.x))
    }

    pub fn remap(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.remap_point(p)).collect()
    }

    /// Append the eliminated coefficient to a reduced coefficient vector.
    pub fn resolve(&self, reduced: &[f64]) -> Result<Vec<f64>> {
        if reduced.len() != self.k.len() {
            return Err(FitError::InputValidation(format!(
                "expected {} reduced coefficients, got {}",
                self.k.len(),
                reduced.len()
            )));
        }
        if let Some(i) = reduced.iter().position(|c| !c.is_finite()) {
            return Err(FitError::InputValidation(format!(
                "reduced coefficient #{i} is not finite ({})",
                reduced[i]
            )));
        }
        let last = self.new_y + reduced.iter().zip(&self.k).map(|(c, k)| c * k).sum::<f64>();
        let mut out = Vec::with_capacity(reduced.len() + 1);
        out.extend_from_slice(reduced);
        out.push(last);
        Ok(out)
    }

    /// Fold `K` into the first `k.len()` functions of `components` and drop the
    /// function at index `k.len()`. Functions after it are kept as-is.
    ///
    /// For a point elimination `components` is the reduced basis itself; for a
    /// slope elimination it is the primary basis, whose trailing constant term
    /// has no derivative counterpart.
    pub(crate) fn fold(&self, components: &Basis) -> Basis {
        let pivot = self.k.len();
        let functions = components.functions();
        let last = functions[pivot].clone();
        let mut out: Vec<BasisFunction> = Vec::with_capacity(functions.len() - 1);
        for (f, &k) in functions[..pivot].iter().zip(&self.k) {
            let f = f.clone();
            let last = last.clone();
            out.push(Arc::new(move |x: f64| f(x) + k * last(x)));
        }
        out.extend(functions[pivot + 1..].iter().cloned());
        Basis::new(out)
    }
}

/// Outcome of eliminating one dimension: the shorter basis plus the step record.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub components: Basis,
    pub step: EliminationStep,
}

impl Reduction {
    pub fn remap(&self, points: &[Point]) -> Vec<Point> {
        self.step.remap(points)
    }

    pub fn resolve(&self, reduced: &[f64]) -> Result<Vec<f64>> {
        self.step.resolve(reduced)
    }
}

/// Eliminate the last function of `components` using the exact constraint `point`.
pub fn reduce(components: &Basis, point: Point) -> Result<Reduction> {
    let step = elimination_step(components, point)?;
    let reduced = step.fold(components);
    Ok(Reduction {
        components: reduced,
        step,
    })
}

/// Compute the step record for eliminating the last function of `components`.
pub(crate) fn elimination_step(components: &Basis, point: Point) -> Result<EliminationStep> {
    if components.is_empty() {
        return Err(FitError::InputValidation(
            "cannot eliminate from an empty basis".to_string(),
        ));
    }
    if !point.is_finite() {
        return Err(FitError::InputValidation(format!(
            "constraint ({}, {}) is not finite",
            point.x, point.y
        )));
    }

    let xi = components.eval_row(point.x);
    let n = xi.len();
    let x_last = xi[n - 1];
    if !(x_last.abs() > EPSILON) {
        return Err(FitError::UnstableSystem(format!(
            "eliminated basis function evaluates to {x_last:e} at x={}",
            point.x
        )));
    }
    if let Some(i) = xi.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InputValidation(format!(
            "basis function #{i} is not finite at x={}",
            point.x
        )));
    }

    let k = xi[..n - 1].iter().map(|v| -v / x_last).collect();
    let eliminated = components.functions()[n - 1].clone();
    Ok(EliminationStep {
        k,
        new_y: point.y / x_last,
        eliminated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::exact::solve_exact;
    use crate::math::basis::polynomial_basis;

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < tol, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn single_function_basis_divides_out() {
        let basis = Basis::from_fns(vec![|x: f64| 2.0 * x]);
        let r = reduce(&basis, Point::new(3.0, 12.0)).unwrap();
        assert!(r.components.is_empty());
        assert_eq!(r.resolve(&[]).unwrap(), vec![2.0]);
    }

    #[test]
    fn reduce_round_trips_against_direct_solve() {
        // y = 5x² - 0.5x + 4
        let f = |x: f64| 5.0 * x * x - 0.5 * x + 4.0;
        let basis = polynomial_basis(2);
        let points: Vec<Point> = [0.0, 3.0, 7.0].iter().map(|&x| Point::new(x, f(x))).collect();
        let direct = solve_exact(&points, &basis).unwrap();

        for constraint_x in [1.0, -2.0, 0.5] {
            let r = reduce(&basis, Point::new(constraint_x, f(constraint_x))).unwrap();
            let remapped = r.remap(&points);
            let reduced = solve_exact(&remapped, &r.components).unwrap();
            let full = r.resolve(&reduced).unwrap();
            assert_close(&full, &direct, 1e-8);
        }
    }

    #[test]
    fn zero_pivot_is_unstable() {
        // With `x` ordered last the pivot vanishes at the origin.
        let basis = Basis::from_fns(vec![
            Box::new(|x: f64| x * x) as Box<dyn Fn(f64) -> f64 + Send + Sync>,
            Box::new(|_x: f64| 1.0),
            Box::new(|x: f64| x),
        ]);
        let err = reduce(&basis, Point::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, FitError::UnstableSystem(_)));

        let err = reduce(&basis, Point::new(1e-10, 1.0)).unwrap_err();
        assert!(matches!(err, FitError::UnstableSystem(_)));
    }

    #[test]
    fn resolve_checks_length_and_finiteness() {
        let r = reduce(&polynomial_basis(2), Point::new(1.0, 1.0)).unwrap();
        assert!(matches!(r.resolve(&[1.0]), Err(FitError::InputValidation(_))));
        assert!(matches!(
            r.resolve(&[1.0, f64::NAN]),
            Err(FitError::InputValidation(_))
        ));
    }

    #[test]
    fn remap_subtracts_known_part() {
        let r = reduce(&polynomial_basis(1), Point::new(2.0, 6.0)).unwrap();
        // Constant eliminated: newY = 6, K = [-2].
        assert_eq!(r.step.new_y(), 6.0);
        assert_eq!(r.step.k(), &[-2.0]);
        assert_eq!(r.remap(&[Point::new(5.0, 10.0)]), vec![Point::new(5.0, 4.0)]);
    }
}
