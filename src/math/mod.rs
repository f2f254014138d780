//! Numerical building blocks: the normal-equation solver and Student's t tail
//! probabilities.

pub mod distribution;
pub mod ols;

pub use distribution::*;
pub use ols::*;
