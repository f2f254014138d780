//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed in-memory between the estimators and the report code
//! - exported to JSON
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::RegressionError;

/// RANSAC search parameters.
///
/// Every field has a default; call sites usually override only a few:
///
/// ```
/// use robust_ols::domain::RansacConfig;
///
/// let config = RansacConfig {
///     max_iteration: 200,
///     ..RansacConfig::default()
/// };
/// assert_eq!(config.min_sample_size, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    /// Fraction of the population drawn as the training sample each iteration.
    pub sample_perc: f64,
    /// Lower bound on the training sample size.
    pub min_sample_size: usize,
    /// Iterations always run before the early-stop test is consulted.
    pub min_iteration: usize,
    /// Hard cap on iterations (the only bound on total work).
    pub max_iteration: usize,
    /// A row is an inlier when its normalized distance is strictly below this.
    pub max_dist_to_be_inlier: f64,
    /// Stop early once the best inlier fraction of the check rows reaches this.
    pub min_inlier_perc_to_stop: f64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            sample_perc: 0.10,
            min_sample_size: 7,
            min_iteration: 50,
            max_iteration: 500,
            max_dist_to_be_inlier: 0.05,
            min_inlier_perc_to_stop: 0.70,
        }
    }
}

impl RansacConfig {
    /// Check parameters that do not depend on the data.
    pub fn validate(&self) -> Result<(), RegressionError> {
        if !(self.sample_perc.is_finite() && (0.0..=1.0).contains(&self.sample_perc)) {
            return Err(RegressionError::config(format!(
                "sample_perc must be within [0, 1], got {}",
                self.sample_perc
            )));
        }
        if self.max_iteration == 0 {
            return Err(RegressionError::config("max_iteration must be >= 1"));
        }
        if self.min_iteration > self.max_iteration {
            return Err(RegressionError::config(format!(
                "min_iteration ({}) exceeds max_iteration ({})",
                self.min_iteration, self.max_iteration
            )));
        }
        if !(self.max_dist_to_be_inlier.is_finite() && self.max_dist_to_be_inlier > 0.0) {
            return Err(RegressionError::config(format!(
                "max_dist_to_be_inlier must be finite and > 0, got {}",
                self.max_dist_to_be_inlier
            )));
        }
        if !(self.min_inlier_perc_to_stop.is_finite()
            && (0.0..=1.0).contains(&self.min_inlier_perc_to_stop))
        {
            return Err(RegressionError::config(format!(
                "min_inlier_perc_to_stop must be within [0, 1], got {}",
                self.min_inlier_perc_to_stop
            )));
        }
        Ok(())
    }

    /// Derive the train/check split sizes for a population of `n_population` rows.
    ///
    /// `n_train = max(min_sample_size, floor(sample_perc · n_population))` and
    /// `n_check = n_population − n_train`; both must be at least one.
    pub fn plan(&self, n_population: usize) -> Result<SamplePlan, RegressionError> {
        self.validate()?;

        let from_perc = (self.sample_perc * n_population as f64).floor() as usize;
        let n_train = self.min_sample_size.max(from_perc);
        if n_train == 0 {
            return Err(RegressionError::config("training sample size is zero"));
        }
        if n_train > n_population {
            return Err(RegressionError::config(format!(
                "training sample size {n_train} exceeds population size {n_population}"
            )));
        }
        let n_check = n_population - n_train;
        if n_check == 0 {
            return Err(RegressionError::config(format!(
                "no rows left to check: training sample uses all {n_population} rows"
            )));
        }

        Ok(SamplePlan {
            n_population,
            n_train,
            n_check,
        })
    }
}

/// Partition sizes used by every RANSAC iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePlan {
    pub n_population: usize,
    pub n_train: usize,
    pub n_check: usize,
}

/// Inferential snapshot of a fitted OLS model.
///
/// Statistics that are undefined (non-positive degrees of freedom, zero
/// spread, ...) are `None` rather than `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsSummary {
    pub n_obs: usize,
    pub n_params: usize,
    pub degrees_of_freedom: isize,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<Option<f64>>,
    pub t_values: Vec<Option<f64>>,
    pub p_values: Vec<Option<f64>>,
    pub mse: Option<f64>,
    pub r_squared: Option<f64>,
}

/// Serializable outcome of a RANSAC run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RansacSummary {
    pub plan: SamplePlan,
    pub iterations: usize,
    pub best_inlier_count: usize,
    pub best_inlier_fraction: f64,
    /// Row indices of the final consensus set.
    pub consensus: Vec<usize>,
    /// Refit on the consensus set.
    pub fit: OlsSummary,
}

/// Parameters for the synthetic contaminated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    pub n_obs: usize,
    pub intercept: f64,
    /// One slope per predictor column.
    pub slopes: Vec<f64>,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the Gaussian noise on clean rows.
    pub noise_sd: f64,
    /// Share of rows replaced by outliers.
    pub outlier_frac: f64,
    /// Minimum absolute shift applied to an outlier's response.
    pub outlier_scale: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            n_obs: 200,
            intercept: 2.0,
            slopes: vec![3.0],
            x_min: 0.0,
            x_max: 1.0,
            noise_sd: 0.01,
            outlier_frac: 0.10,
            outlier_scale: 5.0,
            seed: 42,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sample: SampleConfig,
    pub ransac: RansacConfig,
    /// Seed for the RANSAC permutation source.
    pub ransac_seed: u64,
    /// Run iterations on the rayon pool in batches of `batch_size`.
    pub parallel: bool,
    pub batch_size: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_report: Option<PathBuf>,
}

/// A saved run report (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub sample: SampleConfig,
    pub ransac_config: Option<RansacConfig>,
    /// Plain OLS on every row.
    pub ols: OlsSummary,
    pub ransac: Option<RansacSummary>,
}
