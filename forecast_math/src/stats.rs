//! Descriptive statistics and forecast accuracy metrics

use crate::{MathError, Result};

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty slice".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of a slice
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;

    Ok(variance.sqrt())
}

/// Median of a slice. NaN values are rejected.
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the median of an empty slice".to_string(),
        ));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(MathError::InvalidInput(
            "Median input contains NaN".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Mean absolute percentage error, expressed as a percentage.
///
/// Each absolute error is divided by `max(|actual|, f64::EPSILON)`, so a zero
/// actual value yields a very large but finite term instead of a division by zero.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.len() != predicted.len() {
        return Err(MathError::InvalidInput(format!(
            "Actual length ({}) doesn't match predicted length ({})",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(MathError::InsufficientData(
            "MAPE is undefined for an empty sample".to_string(),
        ));
    }

    let total: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| (a - p).abs() / a.abs().max(f64::EPSILON))
        .sum();

    let mape = total / actual.len() as f64 * 100.0;
    if !mape.is_finite() {
        return Err(MathError::CalculationError(
            "MAPE is not finite; inputs contain NaN or infinite values".to_string(),
        ));
    }

    Ok(mape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(std_dev(&values).unwrap(), 2.0);
    }

    #[test]
    fn test_median() {
        assert_relative_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert!(median(&[]).is_err());
        assert!(median(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_mape() {
        let actual = [100.0, 200.0, 400.0];
        let predicted = [110.0, 180.0, 400.0];
        // (10% + 10% + 0%) / 3
        let mape = mean_absolute_percentage_error(&actual, &predicted).unwrap();
        assert_relative_eq!(mape, 20.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mape_perfect_forecast_is_zero() {
        let values = [5.0, 6.0, 7.0];
        assert_eq!(mean_absolute_percentage_error(&values, &values).unwrap(), 0.0);
    }

    #[test]
    fn test_mape_rejects_empty_and_mismatched() {
        assert!(matches!(
            mean_absolute_percentage_error(&[], &[]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            mean_absolute_percentage_error(&[1.0], &[1.0, 2.0]),
            Err(MathError::InvalidInput(_))
        ));
    }
}
