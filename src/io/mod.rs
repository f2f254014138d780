//! Input/output helpers.
//!
//! - run report JSON read/write (`export`)

pub mod export;

pub use export::*;
