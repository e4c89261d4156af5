//! Sorting, percentile and error helpers over sample points.

use std::cmp::Ordering;

use crate::domain::Point;
use crate::math::basis::Basis;

/// Stable sort of points by ascending `x`.
pub fn sort_by_x(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    sorted
}

/// Nearest-rank percentile position: the number of sorted elements at or below
/// the `p`-th percentile of `n` elements, `ceil(p / 100 * n)` clamped to `[0, n]`.
pub fn percentile_rank(p: f64, n: usize) -> usize {
    if n == 0 || !(p > 0.0) {
        return 0;
    }
    // `100 * k / zones` can land a hair above an integer rank.
    let rank = (p / 100.0 * n as f64 - 1e-9).ceil().max(0.0);
    (rank as usize).min(n)
}

/// Split `n` sorted elements into `zones` contiguous index ranges bounded by the
/// `100 k / zones` percentiles. Every zone is non-empty when `n >= zones`.
pub fn percentile_zones(n: usize, zones: usize) -> Vec<std::ops::Range<usize>> {
    let mut out = Vec::with_capacity(zones);
    let mut start = 0;
    for k in 1..=zones {
        let end = percentile_rank(100.0 * k as f64 / zones as f64, n);
        out.push(start..end);
        start = end;
    }
    out
}

/// Mean squared error of `Σ c_i φ_i(x)` against `points`. Empty input yields 0.
pub fn mean_squared_error(points: &[Point], basis: &Basis, coefficients: &[f64]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sse: f64 = points
        .iter()
        .map(|p| {
            let r = p.y - basis.combine(coefficients, p.x);
            r * r
        })
        .sum();
    sse / points.len() as f64
}
