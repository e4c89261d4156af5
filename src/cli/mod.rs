//! Command-line parsing for the constrained curve fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code. Constraint flags use `x:value` pairs, e.g. `--point 0:4`.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Point, SlopeConstraint};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "regress", version, about = "Constrained polynomial curve fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a curve to a CSV of `x,y` points and print the coefficients.
    Fit(FitArgs),
    /// Generate noisy samples of a known polynomial as CSV.
    Sample(SampleArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// CSV file with `x` and `y` columns.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Polynomial degree.
    #[arg(short, long, default_value_t = 1)]
    pub deg: usize,

    /// Use the approximate regime (random restarts + descent) over all points.
    ///
    /// Without this flag only as many points as unknowns are used.
    #[arg(long)]
    pub approximate: bool,

    /// Point the fit must pass through, as `x:y` (repeatable).
    #[arg(long = "point", value_name = "X:Y", allow_hyphen_values = true)]
    pub points: Vec<Pair>,

    /// Slope the fit must have, as `x:dydx` (repeatable).
    #[arg(long = "slope", value_name = "X:DYDX", allow_hyphen_values = true)]
    pub slopes: Vec<Pair>,

    /// Refinement epochs (approximate regime).
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Random restarts before refinement (approximate regime).
    #[arg(long, default_value_t = 5)]
    pub init_epochs: usize,

    /// Initial learning rate (approximate regime).
    #[arg(long, default_value_t = 0.5)]
    pub learning_rate: f64,

    /// Seed for restart sampling; omit for a fresh seed each run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print every improvement of the approximate fit.
    #[arg(long)]
    pub trace: bool,

    /// Render an ASCII plot of points and curve.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the fit (coefficients + grid) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,
}

/// Options for synthetic sample generation.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// True polynomial coefficients, highest power first (comma separated).
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [5.0, -0.5, 4.0])]
    pub coefficients: Vec<f64>,

    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    #[arg(long, default_value_t = -5.0, allow_hyphen_values = true)]
    pub x_min: f64,

    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true)]
    pub x_max: f64,

    /// Standard deviation of the Gaussian noise added to y.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `regress fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// An `x:value` pair from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair(pub f64, pub f64);

impl FromStr for Pair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(':')
            .ok_or_else(|| format!("expected `x:value`, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{v}' is not a number"))
        };
        Ok(Pair(parse(a)?, parse(b)?))
    }
}

impl From<Pair> for Point {
    fn from(Pair(x, y): Pair) -> Self {
        Point::new(x, y)
    }
}

impl From<Pair> for SlopeConstraint {
    fn from(Pair(x, slope): Pair) -> Self {
        SlopeConstraint::new(x, slope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_constraint_pairs() {
        let cli = Cli::parse_from([
            "regress", "fit", "-i", "pts.csv", "--deg", "2", "--approximate", "--point", "0:4",
            "--slope", "-1:-2.5", "--seed", "7",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.deg, 2);
        assert!(args.approximate);
        assert_eq!(args.points, vec![Pair(0.0, 4.0)]);
        assert_eq!(args.slopes, vec![Pair(-1.0, -2.5)]);
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn rejects_malformed_pair() {
        assert!("3".parse::<Pair>().is_err());
        assert!("a:1".parse::<Pair>().is_err());
    }
}
