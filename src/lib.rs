//! `regression-curves` library crate.
//!
//! Fits `y = Σ c_i φ_i(x)` to sample points, either exactly (as many points as
//! coefficients) or approximately (random restarts plus descent), optionally
//! pinned to exact point and slope constraints.
//!
//! The binary (`regress`) is a thin wrapper around this library so that the
//! core logic is testable without spawning processes.
//!
//! ```no_run
//! use regression_curves::domain::{FitOptions, Point};
//! use regression_curves::fit::regress;
//!
//! let points = vec![Point::new(0.0, 4.0), Point::new(3.0, 19.0)];
//! let fit = regress(&points, &FitOptions::default()).unwrap();
//! assert_eq!(fit.coefficients().len(), 2);
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
