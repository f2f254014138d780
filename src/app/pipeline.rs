//! Shared "fit pipeline" logic used by both subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sample generation -> plain OLS -> RANSAC -> outlier detection stats
//!
//! The front-end can then focus on presentation.

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{SampleData, generate_sample};
use crate::domain::{FitReport, OlsSummary, RunConfig};
use crate::error::{AppError, RegressionError};
use crate::fit::{OlsEngine, RansacController, RansacFit};
use crate::report::{Detection, compute_detection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Plain OLS plus RANSAC.
    Robust,
    /// Plain OLS only.
    OlsOnly,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: SampleData,
    /// OLS on every row, outliers included.
    pub ols: OlsSummary,
    pub ransac: Option<RansacFit>,
    pub detection: Option<Detection>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_fit(config: &RunConfig, mode: FitMode) -> Result<RunOutput, AppError> {
    // 1) Generate the contaminated sample.
    let sample = generate_sample(&config.sample)?;

    // 2) Plain OLS on all rows (the baseline RANSAC should beat).
    let mut engine = OlsEngine::new(sample.design.clone(), sample.response.clone())?;
    engine.fit()?;
    let ols = engine.summary().ok_or(RegressionError::SingularMatrix)?;

    // 3) RANSAC.
    let ransac = match mode {
        FitMode::OlsOnly => None,
        FitMode::Robust => {
            let controller = RansacController::new(
                sample.design.clone(),
                sample.response.clone(),
                config.ransac.clone(),
            )?;
            let fit = if config.parallel {
                controller.fitting_parallel(config.ransac_seed, config.batch_size)?
            } else {
                let mut rng = StdRng::seed_from_u64(config.ransac_seed);
                controller.fitting(&mut rng)?
            };
            Some(fit)
        }
    };

    // 4) Compare the consensus set with the known outliers.
    let detection = ransac
        .as_ref()
        .map(|fit| compute_detection(&sample.outlier, &fit.consensus));

    Ok(RunOutput {
        sample,
        ols,
        ransac,
        detection,
    })
}

/// Assemble the JSON export for a finished run.
pub fn build_report(run: &RunOutput, config: &RunConfig) -> FitReport {
    FitReport {
        tool: "rols".to_string(),
        generated_at: Local::now(),
        sample: config.sample.clone(),
        ransac_config: run.ransac.as_ref().map(|_| config.ransac.clone()),
        ols: run.ols.clone(),
        ransac: run.ransac.as_ref().map(RansacFit::to_summary),
    }
}
