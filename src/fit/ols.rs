//! Ordinary least squares with coefficient inference.
//!
//! [`OlsEngine`] owns an immutable design matrix `X` (n × p) and response `y`
//! (n), solves the normal equations on [`OlsEngine::fit`], and derives:
//!
//! - `mse = Σ(Xβ − y)² / (n − p)`
//! - `SE[j] = sqrt(mse) / sqrt(Σ(x_j − mean(x_j))²)`
//! - `t[j] = β[j] / SE[j]`
//! - `p[j] = 2·(1 − T_cdf(|t[j]|; n − p))`
//!
//! The standard error is a per-column (marginal) approximation: it ignores
//! correlation between predictors and is *not* the `sqrt(mse · (XᵗX)⁻¹_jj)`
//! textbook value. A constant column has zero spread, so its SE is infinite
//! and its t-value is zero.
//!
//! Every statistic is `None` while the model is unfitted or when
//! `n − p <= 0`.

use nalgebra::{DMatrix, DVector};

use crate::domain::OlsSummary;
use crate::error::RegressionError;
use crate::math::{solve_normal_equations, two_sided_p_value};

/// OLS estimator over a fixed dataset.
#[derive(Debug, Clone)]
pub struct OlsEngine {
    design: DMatrix<f64>,
    response: DVector<f64>,
    coefficients: DVector<f64>,
    fitted: bool,
}

impl OlsEngine {
    /// Build an unfitted engine. Coefficients start at zero.
    pub fn new(design: DMatrix<f64>, response: DVector<f64>) -> Result<Self, RegressionError> {
        validate_inputs(&design, &response)?;
        let p = design.ncols();
        Ok(Self {
            design,
            response,
            coefficients: DVector::zeros(p),
            fitted: false,
        })
    }

    /// Build an engine over a subset of rows (in the given order).
    pub fn from_rows(
        design: &DMatrix<f64>,
        response: &DVector<f64>,
        rows: &[usize],
    ) -> Result<Self, RegressionError> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= design.nrows() || r >= response.len()) {
            return Err(RegressionError::config(format!(
                "row index {bad} out of range for {} observations",
                design.nrows()
            )));
        }
        Self::new(design.select_rows(rows), response.select_rows(rows))
    }

    /// Solve `(XᵗX) β = Xᵗy` and store the coefficients.
    ///
    /// On failure the engine is reset to its unfitted state (zero
    /// coefficients), so stale estimates are never reported.
    pub fn fit(&mut self) -> Result<&DVector<f64>, RegressionError> {
        match solve_normal_equations(&self.design, &self.response) {
            Ok(beta) => {
                self.coefficients = beta;
                self.fitted = true;
                Ok(&self.coefficients)
            }
            Err(err) => {
                self.coefficients.fill(0.0);
                self.fitted = false;
                Err(err)
            }
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    pub fn design(&self) -> &DMatrix<f64> {
        &self.design
    }

    pub fn response(&self) -> &DVector<f64> {
        &self.response
    }

    pub fn rows(&self) -> usize {
        self.design.nrows()
    }

    pub fn columns(&self) -> usize {
        self.design.ncols()
    }

    /// `rows − columns`; may be zero or negative.
    pub fn degrees_of_freedom(&self) -> isize {
        self.rows() as isize - self.columns() as isize
    }

    /// `Xβ` on the training data.
    pub fn fitted_values(&self) -> Option<DVector<f64>> {
        self.fitted.then(|| &self.design * &self.coefficients)
    }

    /// `y − Xβ` on the training data.
    pub fn residuals(&self) -> Option<DVector<f64>> {
        self.fitted_values().map(|fit| &self.response - fit)
    }

    /// Predict responses for new rows with the same column layout.
    pub fn predict(&self, design: &DMatrix<f64>) -> Result<DVector<f64>, RegressionError> {
        if !self.fitted {
            return Err(RegressionError::config("model has not been fitted"));
        }
        if design.ncols() != self.columns() {
            return Err(RegressionError::config(format!(
                "expected {} columns, got {}",
                self.columns(),
                design.ncols()
            )));
        }
        Ok(design * &self.coefficients)
    }

    fn sum_squared_residuals(&self) -> Option<f64> {
        self.residuals().map(|r| r.norm_squared())
    }

    /// `Σ(Xβ − y)² / (rows − columns)`.
    pub fn mean_squared_error(&self) -> Option<f64> {
        let df = self.degrees_of_freedom();
        if df <= 0 {
            return None;
        }
        self.sum_squared_residuals().map(|sse| sse / df as f64)
    }

    /// Coefficient of determination `1 − SSE/SST`.
    ///
    /// `None` when unfitted or when the response is constant.
    pub fn r_squared(&self) -> Option<f64> {
        let sse = self.sum_squared_residuals()?;
        let mean = self.response.mean();
        let sst: f64 = self.response.iter().map(|v| (v - mean).powi(2)).sum();
        if sst > 0.0 { Some(1.0 - sse / sst) } else { None }
    }

    /// Marginal standard error of coefficient `col` (see module docs).
    pub fn standard_error(&self, col: usize) -> Option<f64> {
        if col >= self.columns() {
            return None;
        }
        let mse = self.mean_squared_error()?;
        let column = self.design.column(col);
        let mean = column.mean();
        let spread: f64 = column.iter().map(|v| (v - mean).powi(2)).sum();

        let se = mse.sqrt() / spread.sqrt();
        if se.is_nan() { None } else { Some(se) }
    }

    /// `β[col] / SE[col]`.
    pub fn t_value(&self, col: usize) -> Option<f64> {
        let se = self.standard_error(col)?;
        let t = self.coefficients[col] / se;
        if t.is_nan() { None } else { Some(t) }
    }

    /// Two-sided p-value of coefficient `col` with `rows − columns` degrees of freedom.
    pub fn p_value(&self, col: usize) -> Option<f64> {
        let t = self.t_value(col)?;
        two_sided_p_value(t, self.degrees_of_freedom() as f64)
    }

    pub fn standard_errors(&self) -> Vec<Option<f64>> {
        (0..self.columns()).map(|j| self.standard_error(j)).collect()
    }

    pub fn t_values(&self) -> Vec<Option<f64>> {
        (0..self.columns()).map(|j| self.t_value(j)).collect()
    }

    pub fn p_values(&self) -> Vec<Option<f64>> {
        (0..self.columns()).map(|j| self.p_value(j)).collect()
    }

    /// Snapshot of all statistics, or `None` before a successful fit.
    pub fn summary(&self) -> Option<OlsSummary> {
        if !self.fitted {
            return None;
        }
        Some(OlsSummary {
            n_obs: self.rows(),
            n_params: self.columns(),
            degrees_of_freedom: self.degrees_of_freedom(),
            coefficients: self.coefficients.iter().copied().collect(),
            std_errors: self.standard_errors(),
            t_values: self.t_values(),
            p_values: self.p_values(),
            mse: self.mean_squared_error(),
            r_squared: self.r_squared(),
        })
    }
}

/// Shape and finiteness checks shared by every estimator over `(X, y)`.
pub(crate) fn validate_inputs(design: &DMatrix<f64>, response: &DVector<f64>) -> Result<(), RegressionError> {
    if design.nrows() != response.len() {
        return Err(RegressionError::config(format!(
            "design matrix has {} rows but response has {} values",
            design.nrows(),
            response.len()
        )));
    }
    if design.nrows() == 0 {
        return Err(RegressionError::config("no observations"));
    }
    if design.ncols() == 0 {
        return Err(RegressionError::config("design matrix has no columns"));
    }
    if design.iter().chain(response.iter()).any(|v| !v.is_finite()) {
        return Err(RegressionError::config("inputs contain non-finite values"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling_engine() -> OlsEngine {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0, 8.0]);
        OlsEngine::new(x, y).unwrap()
    }

    #[test]
    fn exact_doubling_scenario() {
        let mut engine = doubling_engine();
        let beta = engine.fit().unwrap().clone();

        assert!(beta[0].abs() < 1e-9, "intercept={}", beta[0]);
        assert!((beta[1] - 2.0).abs() < 1e-9, "slope={}", beta[1]);
        assert!(engine.mean_squared_error().unwrap() < 1e-18);
        assert!(engine.p_value(1).unwrap() < 1e-6);
    }

    #[test]
    fn recovers_noiseless_line() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let mut rows = Vec::new();
        for &x in &xs {
            rows.extend_from_slice(&[1.0, x]);
        }
        let design = DMatrix::from_row_slice(xs.len(), 2, &rows);
        let response = DVector::from_iterator(xs.len(), xs.iter().map(|x| -1.5 + 0.75 * x));

        let mut engine = OlsEngine::new(design, response).unwrap();
        engine.fit().unwrap();
        let beta = engine.coefficients();
        assert!((beta[0] + 1.5).abs() < 1e-9);
        assert!((beta[1] - 0.75).abs() < 1e-9);
        assert!(engine.mean_squared_error().unwrap() < 1e-18);
        assert!((engine.r_squared().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fitted_flag_is_explicit() {
        // The true intercept is exactly zero; the model must still count as fitted.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[0.0, 1.0, 2.0]);
        let mut engine = OlsEngine::new(x, y).unwrap();

        assert!(!engine.is_fitted());
        assert!(engine.coefficients().iter().all(|&b| b == 0.0));
        assert!(engine.mean_squared_error().is_none());
        assert!(engine.summary().is_none());

        engine.fit().unwrap();
        assert!(engine.is_fitted());
        assert!(engine.summary().is_some());
    }

    #[test]
    fn refitting_is_deterministic() {
        let x = DMatrix::from_row_slice(5, 2, &[1.0, 0.3, 1.0, 1.1, 1.0, 2.4, 1.0, 3.9, 1.0, 5.2]);
        let y = DVector::from_row_slice(&[1.2, 2.9, 5.1, 8.3, 10.4]);
        let mut engine = OlsEngine::new(x, y).unwrap();

        let first = engine.fit().unwrap().clone();
        let second = engine.fit().unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn degrees_of_freedom_and_undefined_statistics() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[3.0, 5.0]);
        let mut engine = OlsEngine::new(x, y).unwrap();
        engine.fit().unwrap();

        assert_eq!(engine.degrees_of_freedom(), 0);
        assert!(engine.is_fitted());
        assert!(engine.mean_squared_error().is_none());
        assert!(engine.t_value(1).is_none());
        assert!(engine.p_value(1).is_none());
        assert!(engine.p_values().iter().all(Option::is_none));
    }

    #[test]
    fn negative_degrees_of_freedom() {
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0]);
        let engine = OlsEngine::new(x, y).unwrap();
        assert_eq!(engine.degrees_of_freedom(), -2);
    }

    #[test]
    fn singular_fit_resets_state() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let mut engine = OlsEngine::new(x, y).unwrap();

        assert_eq!(engine.fit().unwrap_err(), RegressionError::SingularMatrix);
        assert!(!engine.is_fitted());
        assert!(engine.coefficients().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn marginal_standard_error_matches_formula() {
        let x = DMatrix::from_row_slice(5, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0, 1.0, 5.0]);
        let y = DVector::from_row_slice(&[1.1, 1.9, 3.2, 3.8, 5.1]);
        let mut engine = OlsEngine::new(x, y).unwrap();
        engine.fit().unwrap();

        let mse = engine.mean_squared_error().unwrap();
        // Σ(x − 3)² = 10
        let expected = mse.sqrt() / 10.0_f64.sqrt();
        let se = engine.standard_error(1).unwrap();
        assert!((se - expected).abs() < 1e-12);

        let t = engine.t_value(1).unwrap();
        assert!((t - engine.coefficients()[1] / expected).abs() < 1e-9);

        // Constant column: infinite marginal SE, t = 0, p = 1.
        assert!(engine.standard_error(0).unwrap().is_infinite());
        assert_eq!(engine.t_value(0), Some(0.0));
        assert!((engine.p_value(0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_mismatched_and_non_finite_inputs() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert!(matches!(OlsEngine::new(x, y), Err(RegressionError::Configuration(_))));

        let x = DMatrix::from_row_slice(2, 1, &[1.0, f64::NAN]);
        let y = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(matches!(OlsEngine::new(x, y), Err(RegressionError::Configuration(_))));
    }

    #[test]
    fn from_rows_selects_subset() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 100.0]);
        let y = DVector::from_row_slice(&[3.0, 5.0, 7.0, -50.0]);

        let mut engine = OlsEngine::from_rows(&x, &y, &[2, 0, 1]).unwrap();
        assert_eq!(engine.rows(), 3);
        engine.fit().unwrap();
        assert!((engine.coefficients()[0] - 1.0).abs() < 1e-9);
        assert!((engine.coefficients()[1] - 2.0).abs() < 1e-9);

        assert!(OlsEngine::from_rows(&x, &y, &[0, 4]).is_err());
    }

    #[test]
    fn predict_requires_fit_and_matching_columns() {
        let mut engine = doubling_engine();
        let new_x = DMatrix::from_row_slice(1, 2, &[1.0, 10.0]);
        assert!(engine.predict(&new_x).is_err());

        engine.fit().unwrap();
        let y_hat = engine.predict(&new_x).unwrap();
        assert!((y_hat[0] - 20.0).abs() < 1e-8);

        let wrong = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        assert!(engine.predict(&wrong).is_err());
    }
}
