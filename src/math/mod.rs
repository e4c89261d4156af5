//! Mathematical utilities: basis functions, square solves, and sample statistics.

pub mod basis;
pub mod linalg;
pub mod stats;

pub use basis::*;
pub use linalg::{EPSILON, SolveError};
pub use stats::*;
