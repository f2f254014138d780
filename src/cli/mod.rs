//! Command-line parsing for the robust OLS demo binary.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rols", version, about = "Outlier-robust OLS (RANSAC) with coefficient inference")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a contaminated sample, fit RANSAC and plain OLS, print the comparison.
    Fit(FitArgs),
    /// Fit plain OLS only (no outlier rejection).
    Ols(FitArgs),
}

/// Common options for both commands.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Number of observations to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub n_obs: usize,

    /// True intercept of the clean rows.
    #[arg(long, default_value_t = 2.0, allow_hyphen_values = true)]
    pub intercept: f64,

    /// True slopes, one per predictor (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "3.0", allow_hyphen_values = true)]
    pub slopes: Vec<f64>,

    /// Lower bound of the uniform predictor range.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub x_min: f64,

    /// Upper bound of the uniform predictor range.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub x_max: f64,

    /// Standard deviation of the noise on clean rows.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Share of rows replaced by outliers.
    #[arg(long, default_value_t = 0.10)]
    pub outlier_frac: f64,

    /// Minimum shift applied to outlier responses.
    #[arg(long, default_value_t = 5.0)]
    pub outlier_scale: f64,

    /// Random seed (sample generation and RANSAC permutations).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows drawn as the RANSAC training sample.
    #[arg(long, default_value_t = 0.10)]
    pub sample_perc: f64,

    /// Minimum RANSAC training sample size.
    #[arg(long, default_value_t = 7)]
    pub min_sample_size: usize,

    /// Iterations always run before early stopping is considered.
    #[arg(long, default_value_t = 50)]
    pub min_iteration: usize,

    /// Hard cap on RANSAC iterations.
    #[arg(long, default_value_t = 500)]
    pub max_iteration: usize,

    /// Normalized distance below which a row counts as an inlier.
    #[arg(long, default_value_t = 0.05)]
    pub max_dist: f64,

    /// Stop once this share of the check rows are inliers.
    #[arg(long, default_value_t = 0.70)]
    pub min_inlier_perc: f64,

    /// Run RANSAC iterations in parallel batches.
    #[arg(long)]
    pub parallel: bool,

    /// Iterations per parallel batch.
    #[arg(long, default_value_t = 32)]
    pub batch: usize,

    /// Render an ASCII plot in the terminal (single predictor only).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the run report to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
