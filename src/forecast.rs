//! Ordinary least-squares extrapolation of the closing price.
//!
//! Closes are re-indexed to a 0-based day counter and fit with the
//! closed-form single-variable OLS solution; the forecast is the fitted
//! line evaluated `horizon_days` past the series length. A point
//! estimate only — no confidence interval, no validation split.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("need at least 2 closes to fit a line, got {0}")]
    TooShort(usize),
    #[error("series contains non-finite closes")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits close = slope * day_index + intercept over the whole series.
pub fn fit_line(closes: &[f64]) -> Result<LinearFit, ForecastError> {
    let n = closes.len();
    if n < 2 {
        return Err(ForecastError::TooShort(n));
    }
    if closes.iter().any(|c| !c.is_finite()) {
        return Err(ForecastError::NonFinite);
    }

    let n_f = n as f64;
    let x_sum: f64 = (0..n).map(|i| i as f64).sum();
    let y_sum: f64 = closes.iter().sum();
    let xy_sum: f64 = closes
        .iter()
        .enumerate()
        .map(|(i, y)| i as f64 * y)
        .sum();
    let x2_sum: f64 = (0..n).map(|i| (i as f64) * (i as f64)).sum();

    // The day indices 0..n are distinct, so the denominator is nonzero
    // for every series that passed the length check.
    let slope = (n_f * xy_sum - x_sum * y_sum) / (n_f * x2_sum - x_sum * x_sum);
    let intercept = (y_sum - slope * x_sum) / n_f;

    Ok(LinearFit { slope, intercept })
}

/// Point forecast of the close `horizon_days` trading days past the last
/// observation, evaluated at day index `series length + horizon`.
pub fn forecast_close(closes: &[f64], horizon_days: usize) -> Result<f64, ForecastError> {
    let fit = fit_line(closes)?;
    Ok(fit.value_at((closes.len() + horizon_days) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_a_perfect_line() {
        // close = 100 + index
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let fit = fit_line(&closes).unwrap();

        assert!((fit.slope - 1.0).abs() < 1e-9);
        assert!((fit.intercept - 100.0).abs() < 1e-9);
    }

    #[test]
    fn extrapolates_at_length_plus_horizon() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        // Evaluated at index 10 + 30 = 40 on a unit-slope line from 100.
        let predicted = forecast_close(&closes, 30).unwrap();
        assert!((predicted - 140.0).abs() < 1e-9);
    }

    #[test]
    fn flat_series_predicts_the_flat_price() {
        let closes = vec![55.5; 40];
        let predicted = forecast_close(&closes, 30).unwrap();
        assert!((predicted - 55.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_series() {
        assert!(matches!(
            forecast_close(&[], 30),
            Err(ForecastError::TooShort(0))
        ));
        assert!(matches!(
            forecast_close(&[100.0], 30),
            Err(ForecastError::TooShort(1))
        ));
    }

    #[test]
    fn rejects_non_finite_closes() {
        assert!(matches!(
            forecast_close(&[100.0, f64::NAN, 102.0], 30),
            Err(ForecastError::NonFinite)
        ));
        assert!(matches!(
            forecast_close(&[100.0, f64::INFINITY], 30),
            Err(ForecastError::NonFinite)
        ));
    }
}
