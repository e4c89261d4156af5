//! Regression engine.
//!
//! Responsibilities:
//!
//! - eliminate exact point/slope constraints from the basis (`reduce`, `constraints`)
//! - solve fully determined systems (`exact`)
//! - refine approximate fits from random restarts (`descent`)
//! - dispatch between the two regimes (`regress`)

pub mod constraints;
pub mod descent;
pub mod exact;
pub mod reduce;
pub mod regress;

pub use constraints::*;
pub use descent::*;
pub use exact::*;
pub use reduce::*;
pub use regress::*;
