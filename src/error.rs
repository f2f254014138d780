//! Error types.
//!
//! - [`RegressionError`] is returned by the estimation library (`math`, `fit`).
//! - [`AppError`] is what the `rols` binary reports; it carries a process exit code.

use thiserror::Error;

/// Failures raised by the OLS engine and the RANSAC controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegressionError {
    /// The normal equations `(XᵗX) β = Xᵗy` have no unique solution.
    ///
    /// Recoverable: RANSAC counts a singular sample as zero inliers and moves on.
    #[error("normal equations are singular (collinear or too few rows)")]
    SingularMatrix,

    /// Invalid inputs or parameters. Raised before any computation starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Every RANSAC iteration produced a singular sample, so there is no
    /// model to build a consensus set from.
    #[error("no usable sample found in {iterations} RANSAC iterations")]
    NoConsensus { iterations: usize },
}

impl RegressionError {
    pub fn config(message: impl Into<String>) -> Self {
        RegressionError::Configuration(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RegressionError> for AppError {
    fn from(err: RegressionError) -> Self {
        let exit_code = match err {
            RegressionError::Configuration(_) => 2,
            RegressionError::SingularMatrix | RegressionError::NoConsensus { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_errors_map_to_exit_codes() {
        let config: AppError = RegressionError::config("bad").into();
        assert_eq!(config.exit_code(), 2);
        assert!(config.to_string().contains("bad"));

        let singular: AppError = RegressionError::SingularMatrix.into();
        assert_eq!(singular.exit_code(), 4);

        let none: AppError = RegressionError::NoConsensus { iterations: 5 }.into();
        assert_eq!(none.exit_code(), 4);
        assert!(none.to_string().contains('5'));
    }
}
