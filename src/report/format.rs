//! Formatted terminal output.

use crate::app::pipeline::RunOutput;
use crate::domain::{OlsSummary, RunConfig};
use crate::report::Detection;

/// Format the full run summary (sample, plain OLS, RANSAC, detection).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let mut out = String::new();
    let sample = &run.sample;

    out.push_str("=== rols - robust OLS ===\n");
    out.push_str(&format!(
        "Sample: n={} | predictors={} | noise_sd={} | outliers={} ({:.1}%) | seed={}\n",
        sample.response.len(),
        sample.design.ncols().saturating_sub(1),
        config.sample.noise_sd,
        sample.n_outliers(),
        100.0 * sample.n_outliers() as f64 / sample.response.len().max(1) as f64,
        config.sample.seed,
    ));
    out.push_str(&format!("Truth: {}\n", fmt_vec(&sample.true_coefficients())));

    out.push_str("\nPlain OLS (all rows):\n");
    out.push_str(&format_coefficients(&run.ols));

    if let Some(fit) = &run.ransac {
        let plan = fit.plan;
        out.push_str("\nRANSAC:\n");
        out.push_str(&format!(
            "- plan: population={} train={} check={}\n",
            plan.n_population, plan.n_train, plan.n_check
        ));
        out.push_str(&format!(
            "- iterations: {} (min={}, max={}{})\n",
            fit.iterations,
            config.ransac.min_iteration,
            config.ransac.max_iteration,
            if config.parallel {
                format!(", parallel batch={}", config.batch_size.max(1))
            } else {
                String::new()
            }
        ));
        out.push_str(&format!(
            "- best check inliers: {}/{} ({:.1}%, stop at {:.1}%)\n",
            fit.best_inlier_count,
            plan.n_check,
            100.0 * fit.best_inlier_fraction(),
            100.0 * config.ransac.min_inlier_perc_to_stop
        ));
        out.push_str(&format!(
            "- consensus: {} of {} rows\n",
            fit.consensus.len(),
            plan.n_population
        ));
        if let Some(detection) = &run.detection {
            out.push_str(&format_detection(detection));
        }

        out.push_str("\nRANSAC refit (consensus rows):\n");
        out.push_str(&format_coefficients(&fit.summary));
    }

    out
}

/// Coefficient table with standard errors, t and p values.
///
/// Undefined statistics render as `n/a`.
pub fn format_coefficients(summary: &OlsSummary) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<8} {:>14} {:>12} {:>12} {:>10}\n",
            "term", "estimate", "std_err", "t", "p"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<8} {:-<14} {:-<12} {:-<12} {:-<10}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for (j, beta) in summary.coefficients.iter().enumerate() {
        let se = summary.std_errors.get(j).copied().flatten();
        let t = summary.t_values.get(j).copied().flatten();
        let p = summary.p_values.get(j).copied().flatten();
        out.push_str(
            format!(
                "{:<8} {:>14.6} {:>12} {:>12} {:>10}\n",
                term_name(j),
                beta,
                fmt_opt(se, 6),
                fmt_opt(t, 3),
                fmt_p(p),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format!(
        "n={} df={} mse={} r2={}\n",
        summary.n_obs,
        summary.degrees_of_freedom,
        fmt_opt(summary.mse, 6),
        fmt_opt(summary.r_squared, 4)
    ));
    out
}

fn format_detection(d: &Detection) -> String {
    format!(
        "- outlier detection: flagged={} true_outliers={} precision={} recall={}\n",
        d.flagged,
        d.true_outliers,
        fmt_opt(d.precision(), 3),
        fmt_opt(d.recall(), 3)
    )
}

/// `const` for column 0, `x1`, `x2`, ... for the predictors.
pub fn term_name(col: usize) -> String {
    if col == 0 {
        "const".to_string()
    } else {
        format!("x{col}")
    }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.decimals$}"),
        Some(x) if x.is_infinite() => (if x > 0.0 { "inf" } else { "-inf" }).to_string(),
        _ => "n/a".to_string(),
    }
}

fn fmt_p(p: Option<f64>) -> String {
    match p {
        Some(x) if x < 1e-4 => format!("{x:.2e}"),
        other => fmt_opt(other, 4),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mse: Option<f64>) -> OlsSummary {
        OlsSummary {
            n_obs: 4,
            n_params: 2,
            degrees_of_freedom: 2,
            coefficients: vec![0.5, 2.0],
            std_errors: vec![Some(f64::INFINITY), Some(0.1)],
            t_values: vec![Some(0.0), Some(20.0)],
            p_values: vec![Some(1.0), mse.map(|_| 0.0025)],
            mse,
            r_squared: None,
        }
    }

    #[test]
    fn coefficient_table_renders_undefined_as_na() {
        let table = format_coefficients(&summary(None));
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("term"));
        assert!(lines[2].starts_with("const"));
        assert!(lines[2].contains("inf"));
        assert!(lines[3].starts_with("x1"));
        assert!(lines[3].ends_with("n/a"));
        assert!(lines[4].contains("mse=n/a"));
        assert!(lines[4].contains("r2=n/a"));
    }

    #[test]
    fn coefficient_table_formats_values() {
        let table = format_coefficients(&summary(Some(0.04)));
        assert!(table.contains("2.000000"));
        assert!(table.contains("20.000"));
        assert!(table.contains("0.0025"));
        assert!(table.contains("mse=0.040000"));
    }

    #[test]
    fn tiny_p_values_use_scientific_notation() {
        assert_eq!(fmt_p(Some(1.5e-9)), "1.50e-9");
        assert_eq!(fmt_p(Some(0.25)), "0.2500");
        assert_eq!(fmt_p(None), "n/a");
    }

    #[test]
    fn term_names() {
        assert_eq!(term_name(0), "const");
        assert_eq!(term_name(3), "x3");
    }
}
