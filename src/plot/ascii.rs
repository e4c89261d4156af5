//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - constraint points: `*`

use crate::domain::{CurveFile, Fit, Point, PointResidual};

/// Render a plot for an in-memory fit.
pub fn render_ascii_plot(
    residuals: &[PointResidual],
    fit: &Fit,
    width: usize,
    height: usize,
    constraints: &[Point],
) -> String {
    let (x_min, x_max) = x_range_from_residuals(residuals).unwrap_or((0.0, 1.0));
    let curve = sample_curve(fit, x_min, x_max, width.max(2));
    render_plot(residuals, Some(&curve), x_min, x_max, width, height, constraints)
}

/// Render a plot from a saved curve JSON file (curve and constraints only).
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let (x_min, x_max) = curve_x_range(curve).unwrap_or((0.0, 1.0));
    let curve_points: Vec<(f64, f64)> = curve
        .grid
        .x
        .iter()
        .zip(curve.grid.y.iter())
        .map(|(&x, &y)| (x, y))
        .collect();

    render_plot(
        &[],
        Some(&curve_points),
        x_min,
        x_max,
        width,
        height,
        &curve.point_constraints,
    )
}

fn render_plot(
    residuals: &[PointResidual],
    curve_points: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
    constraints: &[Point],
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let observed = residuals.iter().map(|r| r.point).chain(constraints.iter().copied());
    let (y_min, y_max) = y_range(observed, curve_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    if let Some(curve) = curve_points {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for r in residuals {
        let col = map_x(r.point.x, x_min, x_max, width);
        let row = map_y(r.point.y, y_min, y_max, height);
        grid[row][col] = 'o';
    }
    for p in constraints {
        if p.x < x_min || p.x > x_max {
            continue;
        }
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);
        grid[row][col] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range_from_residuals(residuals: &[PointResidual]) -> Option<(f64, f64)> {
    span(residuals.iter().map(|r| r.point.x))
}

fn curve_x_range(curve: &CurveFile) -> Option<(f64, f64)> {
    span(curve.grid.x.iter().copied())
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn sample_curve(fit: &Fit, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, fit.evaluate(x))
        })
        .collect()
}

fn y_range(
    points: impl Iterator<Item = Point>,
    curve: Option<&[(f64, f64)]>,
) -> Option<(f64, f64)> {
    let curve_ys = curve.into_iter().flatten().map(|&(_, y)| y);
    span(points.map(|p| p.y).chain(curve_ys))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polynomial_basis;

    fn residual(x: f64, y: f64, y_fit: f64) -> PointResidual {
        PointResidual {
            point: Point::new(x, y),
            y_fit,
            residual: y - y_fit,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let points = vec![residual(1.0, 100.0, 100.0), residual(10.0, 110.0, 100.0)];
        let fit = Fit {
            error: 50.0,
            coefficients: vec![100.0],
            basis: polynomial_basis(0),
        };

        let txt = render_ascii_plot(&points, &fit, 10, 5, &[]);
        let expected = concat!(
            "Plot: x=[1.000, 10.000] | y=[99.50, 110.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn constraints_are_starred() {
        let points = vec![residual(0.0, 0.0, 0.0), residual(4.0, 4.0, 4.0)];
        let fit = Fit {
            error: 0.0,
            coefficients: vec![1.0, 0.0],
            basis: polynomial_basis(1),
        };
        let txt = render_ascii_plot(&points, &fit, 10, 5, &[Point::new(2.0, 2.0)]);
        assert_eq!(txt.matches('*').count(), 1);
    }
}
