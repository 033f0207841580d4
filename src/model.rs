/// Nearest-neighbor regression, plus the linear baseline it is compared
/// against in the report.
use linfa::prelude::*;
use linfa_linear::{FittedLinearRegression, LinearRegression};
use ndarray::{Array1, Array2, ArrayView1};
use std::error::Error;

use crate::error::WeatherError;

/// Keeps inverse-distance weights finite when a query lands exactly on a
/// training point.
const WEIGHT_EPS: f64 = 1e-9;

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// k-nearest-neighbor regressor configuration. `weighted` selects
/// inverse-distance averaging over the plain neighbor mean.
#[derive(Debug, Clone, Copy)]
pub struct KnnRegressor {
    k: usize,
    weighted: bool,
}

/// A fitted regressor: kNN "training" is just retaining the feature matrix
/// and targets.
#[derive(Debug)]
pub struct FittedKnn {
    k: usize,
    weighted: bool,
    features: Array2<f64>,
    targets: Array1<f64>,
}

impl KnnRegressor {
    pub fn new(k: usize, weighted: bool) -> Self {
        KnnRegressor { k, weighted }
    }

    pub fn fit(
        &self,
        features: Array2<f64>,
        targets: Array1<f64>,
    ) -> Result<FittedKnn, WeatherError> {
        if self.k == 0 {
            return Err(WeatherError::BadNeighborCount);
        }
        if features.nrows() != targets.len() {
            return Err(WeatherError::ShapeMismatch {
                rows: features.nrows(),
                targets: targets.len(),
            });
        }
        if targets.is_empty() {
            return Err(WeatherError::EmptyDataset);
        }
        Ok(FittedKnn {
            k: self.k,
            weighted: self.weighted,
            features,
            targets,
        })
    }
}

impl FittedKnn {
    pub fn predict(&self, queries: &Array2<f64>) -> Array1<f64> {
        queries
            .rows()
            .into_iter()
            .map(|q| self.predict_one(q))
            .collect()
    }

    fn predict_one(&self, query: ArrayView1<f64>) -> f64 {
        let mut distances: Vec<(f64, f64)> = self
            .features
            .rows()
            .into_iter()
            .zip(self.targets.iter())
            .map(|(row, &t)| (euclidean(query, row), t))
            .collect();
        // stable sort keeps earlier training rows first among exact ties
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        let neighbors = &distances[..self.k.min(distances.len())];

        if !self.weighted || neighbors.iter().all(|&(d, _)| d == 0.0) {
            return neighbors.iter().map(|&(_, t)| t).sum::<f64>() / neighbors.len() as f64;
        }

        let mut weight_sum = 0.0;
        let mut weighted_targets = 0.0;
        for &(d, t) in neighbors {
            let w = 1.0 / (d + WEIGHT_EPS);
            weight_sum += w;
            weighted_targets += w * t;
        }
        weighted_targets / weight_sum
    }
}

/// Ordinary least squares over the same feature matrix, reported alongside
/// kNN so the comparison table has a reference point.
pub struct Baseline {
    inner: FittedLinearRegression<f64>,
}

pub fn fit_baseline(features: Array2<f64>, targets: Array1<f64>) -> Result<Baseline, Box<dyn Error>> {
    let ds = Dataset::new(features, targets);
    let inner = LinearRegression::new().fit(&ds)?;
    Ok(Baseline { inner })
}

impl Baseline {
    pub fn predict(&self, features: &Array2<f64>) -> Array1<f64> {
        self.inner.predict(features)
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        self.inner.params()
    }

    pub fn intercept(&self) -> f64 {
        self.inner.intercept()
    }
}
