//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the logger
//! - parses CLI arguments
//! - generates the synthetic sample
//! - runs plain OLS and (optionally) RANSAC
//! - prints reports/plots
//! - writes the optional JSON export

use clap::Parser;

use crate::cli::{Command, FitArgs};
use crate::domain::{RansacConfig, RunConfig, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Mixed into the CLI seed so the sample and the RANSAC permutations use
/// different streams.
const RANSAC_SEED_SALT: u64 = 0x5EED_0F_0A45AC;

/// Entry point for the `rols` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();

    // We want `rols` and `rols --seed 7` to behave like `rols fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args, pipeline::FitMode::Robust),
        Command::Ols(args) => handle_fit(args, pipeline::FitMode::OlsOnly),
    }
}

fn handle_fit(args: FitArgs, mode: pipeline::FitMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_fit(&config, mode)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if config.plot {
        if let Some(plot) = crate::plot::render_ascii_plot(
            &run.sample,
            run.ransac.as_ref(),
            config.plot_width,
            config.plot_height,
        ) {
            println!("{plot}");
        }
    }

    if let Some(path) = &config.export_report {
        let report = pipeline::build_report(&run, &config);
        crate::io::export::write_report_json(path, &report)?;
    }

    Ok(())
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    RunConfig {
        sample: SampleConfig {
            n_obs: args.n_obs,
            intercept: args.intercept,
            slopes: args.slopes.clone(),
            x_min: args.x_min,
            x_max: args.x_max,
            noise_sd: args.noise,
            outlier_frac: args.outlier_frac,
            outlier_scale: args.outlier_scale,
            seed: args.seed,
        },
        ransac: RansacConfig {
            sample_perc: args.sample_perc,
            min_sample_size: args.min_sample_size,
            min_iteration: args.min_iteration,
            max_iteration: args.max_iteration,
            max_dist_to_be_inlier: args.max_dist,
            min_inlier_perc_to_stop: args.min_inlier_perc,
        },
        ransac_seed: args.seed ^ RANSAC_SEED_SALT,
        parallel: args.parallel,
        batch_size: args.batch,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_report: args.export.clone(),
    }
}

/// Rewrite argv so `rols` defaults to `rols fit`.
///
/// Rules:
/// - `rols`                     -> `rols fit`
/// - `rols --seed 7 ...`        -> `rols fit --seed 7 ...`
/// - `rols --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "fit" | "ols") {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_fit() {
        assert_eq!(rewrite_args(args(&["rols"])), args(&["rols", "fit"]));
        assert_eq!(
            rewrite_args(args(&["rols", "--seed", "7"])),
            args(&["rols", "fit", "--seed", "7"])
        );
        assert_eq!(rewrite_args(args(&["rols", "ols"])), args(&["rols", "ols"]));
        assert_eq!(rewrite_args(args(&["rols", "--help"])), args(&["rols", "--help"]));
    }

    #[test]
    fn args_map_onto_run_config() {
        let cli = crate::cli::Cli::parse_from(["rols", "fit", "--max-dist", "0.2", "--no-plot"]);
        let Command::Fit(fit_args) = cli.command else {
            panic!("expected fit subcommand");
        };
        let config = run_config_from_args(&fit_args);
        assert!((config.ransac.max_dist_to_be_inlier - 0.2).abs() < 1e-12);
        assert_eq!(config.ransac.max_iteration, RansacConfig::default().max_iteration);
        assert_eq!(config.sample, SampleConfig::default());
        assert!(!config.plot);
        assert_ne!(config.ransac_seed, config.sample.seed);
    }
}
