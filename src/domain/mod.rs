//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - estimator configuration (`RansacConfig`, `SamplePlan`)
//! - serializable fit outputs (`OlsSummary`, `RansacSummary`, `FitReport`)
//! - run configuration for the binary (`SampleConfig`, `RunConfig`)

pub mod types;

pub use types::*;
