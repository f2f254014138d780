//! Synthetic contaminated linear datasets.
//!
//! Clean rows follow
//!
//! ```text
//! y = intercept + Σ slope_j · x_j + ε,   x_j ~ U(x_min, x_max),   ε ~ N(0, noise_sd)
//! ```
//!
//! and a fixed share of rows (chosen at random) is pushed off the plane by at
//! least `outlier_scale`, on a random side. The design matrix always carries an
//! intercept column of ones in column 0.

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SampleConfig;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SampleData {
    /// `n × (1 + slopes.len())`, intercept first.
    pub design: DMatrix<f64>,
    pub response: DVector<f64>,
    /// Ground truth: `true` for rows that were turned into outliers.
    pub outlier: Vec<bool>,
    pub config: SampleConfig,
}

impl SampleData {
    pub fn n_outliers(&self) -> usize {
        self.outlier.iter().filter(|&&o| o).count()
    }

    /// Noise-free coefficients `[intercept, slopes...]`.
    pub fn true_coefficients(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.config.slopes.len() + 1);
        out.push(self.config.intercept);
        out.extend_from_slice(&self.config.slopes);
        out
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.n_obs == 0 {
        return Err(AppError::new(2, "Sample size must be > 0."));
    }
    if config.slopes.is_empty() {
        return Err(AppError::new(2, "At least one slope is required."));
    }
    if !(config.intercept.is_finite() && config.slopes.iter().all(|s| s.is_finite())) {
        return Err(AppError::new(2, "Intercept and slopes must be finite."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(2, "Invalid predictor range for sample generation."));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }
    if !(config.outlier_frac.is_finite() && (0.0..1.0).contains(&config.outlier_frac)) {
        return Err(AppError::new(2, "Outlier fraction must be within [0, 1)."));
    }
    if !(config.outlier_scale.is_finite() && config.outlier_scale > 0.0) {
        return Err(AppError::new(2, "Outlier scale must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let n = config.n_obs;
    let p = config.slopes.len() + 1;
    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut response = DVector::<f64>::zeros(n);

    for i in 0..n {
        design[(i, 0)] = 1.0;
        let mut y = config.intercept;
        for (j, slope) in config.slopes.iter().enumerate() {
            let x = rng.gen_range(config.x_min..config.x_max);
            design[(i, j + 1)] = x;
            y += slope * x;
        }
        response[i] = y + normal.sample(&mut rng);
    }

    // Pick exactly round(frac · n) rows to contaminate.
    let n_outliers = ((config.outlier_frac * n as f64).round() as usize).min(n);
    let mut rows: Vec<usize> = (0..n).collect();
    rows.shuffle(&mut rng);

    let mut outlier = vec![false; n];
    for &row in rows.iter().take(n_outliers) {
        let magnitude = config.outlier_scale * (1.0 + rng.r#gen::<f64>());
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        response[row] += sign * magnitude;
        outlier[row] = true;
    }

    Ok(SampleData {
        design,
        response,
        outlier,
        config: config.clone(),
    })
}
