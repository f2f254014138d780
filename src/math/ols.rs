//! Normal-equation solver.
//!
//! Every fit in this crate reduces to the linear system
//!
//! ```text
//! (XᵗX) β = Xᵗy
//! ```
//!
//! Implementation choices:
//! - The Gram matrix `XᵗX` is formed explicitly and solved with a partially
//!   pivoted LU decomposition. Parameter counts are small (a handful of
//!   predictors), so the `p × p` solve is cheap compared to forming `XᵗX`.
//! - nalgebra's `LU::solve` only rejects *exactly* zero pivots. Collinear
//!   columns usually leave a pivot of order `1e-16` instead, so we also reject
//!   pivots that are tiny relative to the largest one.

use nalgebra::{DMatrix, DVector};

use crate::error::RegressionError;

/// Pivots smaller than `PIVOT_RTOL * max|pivot|` mark the Gram matrix as singular.
const PIVOT_RTOL: f64 = 1e-12;

/// Solve the normal equations for `β`.
///
/// Returns [`RegressionError::SingularMatrix`] when `XᵗX` is not invertible
/// (collinear columns, fewer rows than columns, all-zero design).
pub fn solve_normal_equations(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
) -> Result<DVector<f64>, RegressionError> {
    if x.nrows() != y.len() {
        return Err(RegressionError::config(format!(
            "design matrix has {} rows but response has {} values",
            x.nrows(),
            y.len()
        )));
    }
    if x.ncols() == 0 {
        return Err(RegressionError::config("design matrix has no columns"));
    }

    let xt = x.transpose();
    let gram = &xt * x;
    let rhs = &xt * y;

    let lu = gram.lu();
    if has_degenerate_pivot(&lu.u().diagonal()) {
        return Err(RegressionError::SingularMatrix);
    }

    let beta = lu.solve(&rhs).ok_or(RegressionError::SingularMatrix)?;
    if beta.iter().all(|v| v.is_finite()) {
        Ok(beta)
    } else {
        Err(RegressionError::SingularMatrix)
    }
}

fn has_degenerate_pivot(pivots: &DVector<f64>) -> bool {
    let largest = pivots.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if !(largest.is_finite() && largest > 0.0) {
        return true;
    }
    pivots.iter().any(|v| v.abs() <= largest * PIVOT_RTOL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_equations_solve_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_normal_equations(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn duplicated_column_is_singular() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(solve_normal_equations(&x, &y), Err(RegressionError::SingularMatrix));
    }

    #[test]
    fn fewer_rows_than_columns_is_singular() {
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 5.0]);
        let y = DVector::from_row_slice(&[3.0]);
        assert_eq!(solve_normal_equations(&x, &y), Err(RegressionError::SingularMatrix));
    }

    #[test]
    fn zero_design_is_singular() {
        let x = DMatrix::<f64>::zeros(3, 2);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(solve_normal_equations(&x, &y), Err(RegressionError::SingularMatrix));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            solve_normal_equations(&x, &y),
            Err(RegressionError::Configuration(_))
        ));
    }
}
