//! Estimators.
//!
//! Responsibilities:
//!
//! - OLS fit and coefficient inference (`ols`)
//! - RANSAC consensus search around OLS, sequential or batched on rayon (`ransac`)

pub mod ols;
pub mod ransac;

pub use ols::*;
pub use ransac::*;
