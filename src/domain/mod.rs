//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - sample points and slope constraints (`Point`, `SlopeConstraint`)
//! - call configuration (`FitOptions`)
//! - fit outputs (`Fit`, `Regression`, `CurveFile`)

pub mod types;

pub use types::*;
