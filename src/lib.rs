//! `robust-ols` library crate.
//!
//! Ordinary least squares with coefficient inference, and a RANSAC controller
//! that wraps it to find an outlier-free consensus set.
//!
//! The binary (`rols`) is a thin wrapper around this library so that:
//!
//! - estimators are testable without spawning processes
//! - `fit` and `math` can be used on their own, without the CLI pieces

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
