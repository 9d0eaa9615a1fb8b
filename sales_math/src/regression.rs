//! Ordinary least squares
//!
//! Solves `min ||y - Xβ||²` through a singular value decomposition, so
//! rank-deficient designs (a constant column, perfectly collinear regressors)
//! still produce the minimum-norm solution instead of failing.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest one are treated as zero
const RELATIVE_RANK_TOLERANCE: f64 = 1e-10;

/// Result of a least-squares fit
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    /// Intercept term (0.0 when fitted without one)
    pub intercept: f64,
    /// One coefficient per regressor column
    pub coefficients: Vec<f64>,
    /// In-sample fitted values
    pub fitted: Vec<f64>,
    /// `y - fitted`
    pub residuals: Vec<f64>,
    /// Residual sum of squares
    pub sse: f64,
    /// Numerical rank of the design matrix
    pub rank: usize,
}

impl LeastSquaresFit {
    /// Evaluate the fitted linear function at one row of regressors
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(beta, x)| beta * x)
                .sum::<f64>()
    }

    /// Coefficient of determination of the in-sample fit
    pub fn r_squared(&self, y: &[f64]) -> Option<f64> {
        if y.is_empty() {
            return None;
        }
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let ss_total: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        if ss_total.abs() < f64::EPSILON {
            return None;
        }
        Some(1.0 - self.sse / ss_total)
    }
}

/// Fit `y` on the regressor rows `x`, optionally with an intercept column.
pub fn least_squares(x: &[Vec<f64>], y: &[f64], intercept: bool) -> Result<LeastSquaresFit> {
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            x.len(),
            y.len()
        )));
    }
    if y.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot fit least squares on zero observations".to_string(),
        ));
    }

    let n_regressors = x[0].len();
    if let Some(bad) = x.iter().position(|row| row.len() != n_regressors) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} regressors, expected {}",
            bad,
            x[bad].len(),
            n_regressors
        )));
    }

    let offset = usize::from(intercept);
    let n_columns = n_regressors + offset;
    if n_columns == 0 {
        return Err(MathError::InvalidInput(
            "Least squares needs at least one column".to_string(),
        ));
    }

    let mut data = Vec::with_capacity(y.len() * n_columns);
    for row in x {
        if intercept {
            data.push(1.0);
        }
        data.extend_from_slice(row);
    }
    if data.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Least squares inputs must be finite".to_string(),
        ));
    }

    let design = DMatrix::from_row_slice(y.len(), n_columns, &data);
    let target = DVector::from_vec(y.to_vec());

    let svd = design.clone().svd(true, true);
    let largest = svd.singular_values.max();
    let eps = (largest * RELATIVE_RANK_TOLERANCE).max(f64::MIN_POSITIVE);
    let rank = svd.rank(eps);
    let beta = svd
        .solve(&target, eps)
        .map_err(|e| MathError::CalculationError(e.to_string()))?;

    let fitted_vec = &design * &beta;
    let fitted: Vec<f64> = fitted_vec.iter().copied().collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, f)| a - f).collect();
    let sse = residuals.iter().map(|r| r * r).sum();

    let (intercept_value, coefficients) = if intercept {
        (beta[0], beta.iter().skip(1).copied().collect())
    } else {
        (0.0, beta.iter().copied().collect())
    };

    Ok(LeastSquaresFit {
        intercept: intercept_value,
        coefficients,
        fitted,
        residuals,
        sse,
        rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_exact_plane() {
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - 0.5 * r[1]).collect();

        let fit = least_squares(&x, &y, true).unwrap();
        assert_abs_diff_eq!(fit.intercept, 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.coefficients[1], -0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.sse, 0.0, epsilon = 1e-8);
        assert_eq!(fit.rank, 3);
        assert_abs_diff_eq!(fit.r_squared(&y).unwrap(), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.predict_row(&[10.0, 2.0]), 22.0, epsilon = 1e-8);
    }

    #[test]
    fn tolerates_constant_column() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 0.0]).collect();
        let y: Vec<f64> = (0..10).map(|i| 1.0 + i as f64).collect();

        let fit = least_squares(&x, &y, true).unwrap();
        assert_eq!(fit.rank, 2);
        assert_abs_diff_eq!(fit.coefficients[1], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(fit.predict_row(&[4.0, 0.0]), 5.0, epsilon = 1e-8);
    }

    #[test]
    fn rejects_mismatched_rows() {
        let x = vec![vec![1.0], vec![2.0]];
        assert!(matches!(
            least_squares(&x, &[1.0], true),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            least_squares(&[], &[], true),
            Err(MathError::InsufficientData(_))
        ));
    }
}
