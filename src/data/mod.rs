//! Input data for the `rols` binary.
//!
//! File ingest is not part of this crate; the binary works on seeded synthetic
//! samples instead (`sample`).

pub mod sample;

pub use sample::*;
