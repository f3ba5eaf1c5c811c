//! Dense least squares for small design matrices
//!
//! Design matrices are row-major `Vec<Vec<f64>>`, one row per observation.

use crate::{MathError, Result};

/// Solve `A x = b` for a symmetric positive definite `A` using Cholesky
/// decomposition.
pub fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    if a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Matrix must be square for Cholesky decomposition".to_string(),
        ));
    }
    if b.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Matrix rows ({}) must match vector length ({})",
            n,
            b.len()
        )));
    }

    // A = L * L^T
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();

            if i == j {
                let diag = a[j][j] - sum;
                if !diag.is_finite() || diag <= 0.0 {
                    return Err(MathError::CalculationError(format!(
                        "Matrix is not positive definite (pivot {} = {:e}); \
                         check for collinear or constant features",
                        j, diag
                    )));
                }
                l[j][j] = diag.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[i][j] * y[j]).sum();
        y[i] = (b[i] - sum) / l[i][i];
    }

    // Backward substitution: L^T * x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[j][i] * x[j]).sum();
        x[i] = (y[i] - sum) / l[i][i];
    }

    Ok(x)
}

/// Fit `target ~ design` by ridge regression.
///
/// `penalties[j]` is added to the j-th diagonal entry of the normal equations,
/// so a zero penalty leaves that coefficient unregularized.
pub fn ridge_regression(design: &[Vec<f64>], target: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Design matrix has no rows".to_string(),
        ));
    }
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design rows ({}) don't match target length ({})",
            design.len(),
            target.len()
        )));
    }

    let p = penalties.len();
    if design.iter().any(|row| row.len() != p) {
        return Err(MathError::InvalidInput(format!(
            "Every design row must have {} columns",
            p
        )));
    }
    if design.iter().flatten().chain(target.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Design matrix or target contains NaN or infinite values".to_string(),
        ));
    }

    // Normal equations: (X^T X + diag(penalties)) beta = X^T y
    let mut gram = vec![vec![0.0; p]; p];
    let mut moment = vec![0.0; p];
    for (row, &y) in design.iter().zip(target.iter()) {
        for i in 0..p {
            moment[i] += row[i] * y;
            for j in 0..=i {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..p {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[j][i] = gram[i][j];
        }
    }

    let beta = cholesky_solve(&gram, &moment)?;
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares solution is not finite".to_string(),
        ));
    }

    Ok(beta)
}
