// Regression metrics over a held-out sample.
use ndarray::Array1;

use crate::error::WeatherError;

/// RMSE, MAE, and R². R² is `None` when the statistic is undefined: fewer
/// than two samples, or actuals with zero variance.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: Option<f64>,
}

pub fn evaluate(predicted: &Array1<f64>, actual: &Array1<f64>) -> Result<Metrics, WeatherError> {
    if predicted.len() != actual.len() {
        return Err(WeatherError::LengthMismatch {
            predicted: predicted.len(),
            actual: actual.len(),
        });
    }
    if actual.is_empty() {
        return Err(WeatherError::EmptySample);
    }

    let n = actual.len() as f64;
    let sq_err: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    let abs_err: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).abs())
        .sum();

    let rmse = (sq_err / n).sqrt();
    let mae = abs_err / n;

    // Constancy is checked on the values themselves: the computed mean of a
    // constant vector can be off by a rounding error, which leaves ss_tot
    // tiny but nonzero and R² a wild finite number.
    let r_squared = if actual.len() < 2 || actual.iter().all(|&a| a == actual[0]) {
        None
    } else {
        let mean = actual.sum() / n;
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        if ss_tot == 0.0 {
            None
        } else {
            Some(1.0 - sq_err / ss_tot)
        }
    };

    Ok(Metrics {
        rmse,
        mae,
        r_squared,
    })
}
