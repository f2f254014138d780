//! Read/write run reports as JSON.
//!
//! The schema is defined by `domain::FitReport`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::FitReport;
use crate::error::AppError;

/// Write a run report as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    log::info!("wrote report to {}", path.display());
    Ok(())
}

/// Read a report previously written by [`write_report_json`].
pub fn read_report_json(path: &Path) -> Result<FitReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: FitReport =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{FitMode, build_report, run_fit};
    use crate::domain::{RansacConfig, RunConfig, SampleConfig};

    fn run_config() -> RunConfig {
        RunConfig {
            sample: SampleConfig {
                n_obs: 80,
                ..SampleConfig::default()
            },
            ransac: RansacConfig {
                sample_perc: 0.10,
                ..RansacConfig::default()
            },
            ransac_seed: 3,
            parallel: false,
            batch_size: 8,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_report: None,
        }
    }

    #[test]
    fn report_survives_a_write_read_cycle() {
        let config = run_config();
        let run = run_fit(&config, FitMode::Robust).unwrap();
        let report = build_report(&run, &config);

        let path = std::env::temp_dir().join(format!("rols-report-{}.json", std::process::id()));
        write_report_json(&path, &report).unwrap();
        let back = read_report_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.tool, "rols");
        assert_eq!(back.sample, report.sample);
        assert_eq!(back.ransac_config, report.ransac_config);
        let (a, b) = (report.ransac.unwrap(), back.ransac.unwrap());
        assert_eq!(a.consensus, b.consensus);
        assert_eq!(a.iterations, b.iterations);
        assert_eq!(back.ols.n_obs, 80);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let path = std::env::temp_dir().join("rols-report-does-not-exist.json");
        let err = read_report_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let path = std::env::temp_dir().join(format!("rols-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_report_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("Invalid report JSON"));
    }
}
