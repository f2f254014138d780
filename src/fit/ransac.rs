//! RANSAC wrapper around [`OlsEngine`].
//!
//! Each iteration:
//! 1. shuffles the row indices
//! 2. fits OLS on the first `n_train` rows
//! 3. counts inliers among the remaining `n_check` rows
//! 4. keeps the fit if its inlier count is `>=` the best so far (later ties win)
//!
//! The loop continues while `iterations < min_iteration`, or while
//! `iterations < max_iteration` and the best inlier fraction of the check rows
//! is below `min_inlier_perc_to_stop`.
//!
//! Finalization recomputes distances over *every* row with the best
//! coefficients, takes all rows under the threshold as the consensus set, and
//! refits OLS on it.
//!
//! A row's distance is
//!
//! ```text
//! |y − x·β| / sqrt(Σ_{j≥1} β_j² + 1)
//! ```
//!
//! i.e. the residual scaled by the norm of the non-intercept coefficients plus
//! one, which approximates the perpendicular distance to the fitted hyperplane
//! and assumes column 0 is the intercept.
//! NOTE: this is not a standard perpendicular or residual-scale normalization;
//! review before changing it, fitted results depend on it.
//!
//! Randomness is always supplied by the caller: [`RansacController::fitting`]
//! takes an RNG, [`RansacController::fitting_parallel`] takes a seed.

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::domain::{OlsSummary, RansacConfig, RansacSummary, SamplePlan};
use crate::error::RegressionError;
use crate::fit::ols::{OlsEngine, validate_inputs};

/// Increment used to spread per-iteration seeds in the parallel search.
const SEED_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Consensus-based robust OLS.
#[derive(Debug, Clone)]
pub struct RansacController {
    design: DMatrix<f64>,
    response: DVector<f64>,
    config: RansacConfig,
    plan: SamplePlan,
}

/// Final outcome of a RANSAC run.
#[derive(Debug, Clone)]
pub struct RansacFit {
    /// Coefficients of the refit on the consensus set.
    pub coefficients: DVector<f64>,
    /// p-values of the refit, one per column.
    pub p_values: Vec<Option<f64>>,
    /// Mean squared error of the refit.
    pub mse: Option<f64>,
    /// Row indices whose distance to the best model is under the threshold.
    pub consensus: Vec<usize>,
    /// Highest inlier count seen on a check partition during the search.
    pub best_inlier_count: usize,
    pub iterations: usize,
    pub plan: SamplePlan,
    pub summary: OlsSummary,
}

impl RansacFit {
    /// `best_inlier_count / n_check`.
    pub fn best_inlier_fraction(&self) -> f64 {
        self.best_inlier_count as f64 / self.plan.n_check as f64
    }

    /// Split into `(coefficients, p_values, mse)`.
    pub fn into_parts(self) -> (DVector<f64>, Vec<Option<f64>>, Option<f64>) {
        (self.coefficients, self.p_values, self.mse)
    }

    pub fn to_summary(&self) -> RansacSummary {
        RansacSummary {
            plan: self.plan,
            iterations: self.iterations,
            best_inlier_count: self.best_inlier_count,
            best_inlier_fraction: self.best_inlier_fraction(),
            consensus: self.consensus.clone(),
            fit: self.summary.clone(),
        }
    }
}

/// Accumulator state carried across iterations.
#[derive(Debug, Default)]
struct Search {
    best: Option<Candidate>,
    singular: usize,
}

impl Search {
    fn absorb(&mut self, iteration: usize, outcome: Option<Candidate>, n_check: usize) {
        match outcome {
            Some(candidate) => {
                let inliers = candidate.inliers;
                accumulate(&mut self.best, candidate);
                debug!(
                    "ransac iteration {iteration}: {inliers}/{n_check} check rows are inliers (best {})",
                    self.best_inliers()
                );
            }
            None => {
                self.singular += 1;
                debug!("ransac iteration {iteration}: singular training sample, counted as zero inliers");
            }
        }
    }

    fn best_inliers(&self) -> usize {
        inlier_count(&self.best)
    }
}

/// A usable model from one iteration.
#[derive(Debug, Clone)]
struct Candidate {
    coefficients: DVector<f64>,
    p_values: Vec<Option<f64>>,
    mse: Option<f64>,
    inliers: usize,
}

impl RansacController {
    /// Validate inputs and configuration; no iteration runs here.
    pub fn new(
        design: DMatrix<f64>,
        response: DVector<f64>,
        config: RansacConfig,
    ) -> Result<Self, RegressionError> {
        validate_inputs(&design, &response)?;

        let plan = config.plan(design.nrows())?;
        if plan.n_train < design.ncols() {
            return Err(RegressionError::config(format!(
                "training sample size {} is smaller than the {} model columns",
                plan.n_train,
                design.ncols()
            )));
        }

        Ok(Self {
            design,
            response,
            config,
            plan,
        })
    }

    pub fn plan(&self) -> SamplePlan {
        self.plan
    }

    pub fn config(&self) -> &RansacConfig {
        &self.config
    }

    /// Run the sequential search with the given permutation source.
    pub fn fitting<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RansacFit, RegressionError> {
        let mut search = Search::default();
        let mut iterations = 0;

        loop {
            let outcome = self.evaluate_sample(rng)?;
            search.absorb(iterations, outcome, self.plan.n_check);
            iterations += 1;
            if !self.should_continue(iterations, search.best_inliers()) {
                break;
            }
        }

        self.finalize(search, iterations)
    }

    /// Run iterations on the rayon pool in batches of `batch_size`.
    ///
    /// Iteration `i` draws its permutation from an RNG seeded by `(seed, i)`,
    /// and each batch is reduced in iteration order before the stopping rule
    /// is checked, so the result does not depend on the thread count. The
    /// stopping rule is only evaluated at batch boundaries, so a run may do up
    /// to `batch_size − 1` more iterations than the sequential search would.
    pub fn fitting_parallel(&self, seed: u64, batch_size: usize) -> Result<RansacFit, RegressionError> {
        let batch_size = batch_size.max(1);
        let mut search = Search::default();
        let mut iterations = 0;

        loop {
            let end = (iterations + batch_size).min(self.config.max_iteration);
            let outcomes = (iterations..end)
                .into_par_iter()
                .map(|idx| {
                    let mut rng = iteration_rng(seed, idx);
                    self.evaluate_sample(&mut rng)
                })
                .collect::<Result<Vec<_>, RegressionError>>()?;

            for (offset, outcome) in outcomes.into_iter().enumerate() {
                search.absorb(iterations + offset, outcome, self.plan.n_check);
            }
            iterations = end;

            if !self.should_continue(iterations, search.best_inliers()) {
                break;
            }
        }

        self.finalize(search, iterations)
    }

    fn should_continue(&self, iterations: usize, best_inliers: usize) -> bool {
        let fraction = best_inliers as f64 / self.plan.n_check as f64;
        iterations < self.config.min_iteration
            || (iterations < self.config.max_iteration
                && fraction < self.config.min_inlier_perc_to_stop)
    }

    /// One sample/fit/check round. `Ok(None)` means the sample was singular.
    fn evaluate_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<Candidate>, RegressionError> {
        let mut order: Vec<usize> = (0..self.plan.n_population).collect();
        order.shuffle(rng);
        let (train, check) = order.split_at(self.plan.n_train);

        let mut engine = OlsEngine::from_rows(&self.design, &self.response, train)?;
        let coefficients = match engine.fit() {
            Ok(beta) => beta.clone(),
            Err(RegressionError::SingularMatrix) => return Ok(None),
            Err(err) => return Err(err),
        };
        let inliers = self.count_inliers(check, &coefficients);

        Ok(Some(Candidate {
            coefficients,
            p_values: engine.p_values(),
            mse: engine.mean_squared_error(),
            inliers,
        }))
    }

    /// Inliers among `rows` only; the other rows are never touched.
    fn count_inliers(&self, rows: &[usize], beta: &DVector<f64>) -> usize {
        let scale = distance_scale(beta);
        rows.iter()
            .filter(|&&row| {
                let predicted: f64 = self
                    .design
                    .row(row)
                    .iter()
                    .zip(beta.iter())
                    .map(|(x, b)| x * b)
                    .sum();
                (self.response[row] - predicted).abs() / scale < self.config.max_dist_to_be_inlier
            })
            .count()
    }

    fn finalize(&self, search: Search, iterations: usize) -> Result<RansacFit, RegressionError> {
        if search.singular > 0 {
            warn!(
                "{} of {iterations} ransac samples were singular and counted as zero inliers",
                search.singular
            );
        }
        let Some(best) = search.best else {
            return Err(RegressionError::NoConsensus { iterations });
        };
        info!(
            "ransac stopped after {iterations} iterations; best {}/{} check rows inliers (search mse {:?})",
            best.inliers, self.plan.n_check, best.mse
        );
        debug!("best search p-values: {:?}", best.p_values);

        let distances = normalized_distances(&self.design, &self.response, &best.coefficients);
        let consensus: Vec<usize> = distances
            .iter()
            .enumerate()
            .filter(|(_, d)| **d < self.config.max_dist_to_be_inlier)
            .map(|(row, _)| row)
            .collect();

        if consensus.len() < self.design.ncols() {
            warn!(
                "consensus set has {} rows, fewer than the {} model columns",
                consensus.len(),
                self.design.ncols()
            );
            return Err(RegressionError::SingularMatrix);
        }

        let mut engine = OlsEngine::from_rows(&self.design, &self.response, &consensus)?;
        engine.fit()?;
        let summary = engine.summary().ok_or(RegressionError::SingularMatrix)?;
        info!(
            "refit on {} of {} rows (df={})",
            consensus.len(),
            self.plan.n_population,
            engine.degrees_of_freedom()
        );

        Ok(RansacFit {
            coefficients: engine.coefficients().clone(),
            p_values: engine.p_values(),
            mse: engine.mean_squared_error(),
            consensus,
            best_inlier_count: best.inliers,
            iterations,
            plan: self.plan,
            summary,
        })
    }
}

/// Distance of every row to the hyperplane `y = Xβ`, normalized as described
/// in the module docs.
pub fn normalized_distances(
    design: &DMatrix<f64>,
    response: &DVector<f64>,
    beta: &DVector<f64>,
) -> DVector<f64> {
    let scale = distance_scale(beta);
    (design * beta - response).map(|r| r.abs() / scale)
}

/// Distance of a single row `(x_row, y)` to the hyperplane.
///
/// Returns `None` when `x_row` and `beta` differ in length.
pub fn normalized_distance(x_row: &[f64], y: f64, beta: &DVector<f64>) -> Option<f64> {
    if x_row.len() != beta.len() {
        return None;
    }
    let predicted: f64 = x_row.iter().zip(beta.iter()).map(|(x, b)| x * b).sum();
    Some((y - predicted).abs() / distance_scale(beta))
}

/// `sqrt(Σ_{j≥1} β_j² + 1)`.
pub fn distance_scale(beta: &DVector<f64>) -> f64 {
    let slopes: f64 = beta.iter().skip(1).map(|b| b * b).sum();
    (slopes + 1.0).sqrt()
}

fn accumulate(best: &mut Option<Candidate>, candidate: Candidate) {
    let replace = best.as_ref().is_none_or(|b| candidate.inliers >= b.inliers);
    if replace {
        *best = Some(candidate);
    }
}

fn inlier_count(best: &Option<Candidate>) -> usize {
    best.as_ref().map_or(0, |b| b.inliers)
}

fn iteration_rng(seed: u64, iteration: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add((iteration as u64).wrapping_mul(SEED_GAMMA)))
}
