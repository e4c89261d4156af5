//! Input/output helpers.
//!
//! - CSV ingest of sample points (`ingest`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod ingest;

pub use curve::*;
pub use ingest::*;
