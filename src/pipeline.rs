// Feature preprocessing with an explicit fit/transform split: imputation and
// scaling parameters are learned from the training rows once, then applied
// unchanged to anything that needs transforming. Nothing here ever computes
// a statistic from test data.
use ndarray::{Array1, Array2};

use crate::error::WeatherError;
use crate::preprocess::Observation;
use crate::split::TrainSet;

/// The predictor columns, in matrix order.
pub const PREDICTORS: [&str; 2] = ["relative_humidity", "dry_bulb_temp_f"];

fn predictor(obs: &Observation, idx: usize) -> f64 {
    match idx {
        0 => obs.relative_humidity,
        _ => obs.dry_bulb_temp_f,
    }
}

/// Pipeline configuration. Degree 1 is impute-and-standardize only; degree 2
/// additionally expands each standardized predictor into first- and
/// second-power terms.
#[derive(Debug, Clone, Copy)]
pub struct FeaturePipeline {
    degree: usize,
}

#[derive(Debug, Clone, Copy)]
struct FeatureStats {
    median: f64,
    mean: f64,
    std: f64,
}

/// Parameters learned from the training split, frozen thereafter.
#[derive(Debug)]
pub struct FittedPipeline {
    stats: [FeatureStats; 2],
    degree: usize,
}

impl FeaturePipeline {
    pub fn new(degree: usize) -> Result<Self, WeatherError> {
        if !(1..=2).contains(&degree) {
            return Err(WeatherError::BadDegree(degree));
        }
        Ok(FeaturePipeline { degree })
    }

    /// Learn the per-predictor median (for imputation) and mean/standard
    /// deviation (for standardization) from the training rows only. The
    /// signature takes `TrainSet` rather than a plain slice so held-out data
    /// cannot end up here.
    pub fn fit(&self, train: &TrainSet) -> Result<FittedPipeline, WeatherError> {
        if train.is_empty() {
            return Err(WeatherError::EmptyDataset);
        }

        let mut stats = [FeatureStats {
            median: 0.0,
            mean: 0.0,
            std: 0.0,
        }; 2];

        for (idx, &name) in PREDICTORS.iter().enumerate() {
            let mut values: Vec<f64> = train
                .rows()
                .iter()
                .map(|o| predictor(o, idx))
                .filter(|v| !v.is_nan())
                .collect();
            if values.is_empty() {
                return Err(WeatherError::EmptyDataset);
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let n = values.len();
            let median = if n % 2 == 1 {
                values[n / 2]
            } else {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            };
            let mean = values.iter().sum::<f64>() / n as f64;
            // sample variance; a single row has no spread to standardize by
            let var = if n > 1 {
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
            } else {
                0.0
            };
            let std = var.sqrt();
            if std == 0.0 {
                return Err(WeatherError::ConstantFeature(name));
            }

            stats[idx] = FeatureStats { median, mean, std };
        }

        Ok(FittedPipeline {
            stats,
            degree: self.degree,
        })
    }
}

impl FittedPipeline {
    /// Build the feature matrix for any set of rows: impute missing values
    /// with the fitted median, standardize with the fitted mean/std, and in
    /// degree-2 mode emit the first- and second-power terms per predictor.
    /// Pure with respect to the fitted state; nothing is recomputed here.
    pub fn transform(&self, rows: &[Observation]) -> Array2<f64> {
        let width = PREDICTORS.len() * self.degree;
        let mut x = Array2::<f64>::zeros((rows.len(), width));

        for (i, obs) in rows.iter().enumerate() {
            for (j, st) in self.stats.iter().enumerate() {
                let raw = predictor(obs, j);
                let v = if raw.is_nan() { st.median } else { raw };
                let z = (v - st.mean) / st.std;
                if self.degree == 1 {
                    x[(i, j)] = z;
                } else {
                    x[(i, 2 * j)] = z;
                    x[(i, 2 * j + 1)] = z * z;
                }
            }
        }

        x
    }

    /// Column names of the transformed matrix, `<feature>_poly_<power>` in
    /// degree-2 mode.
    pub fn feature_names(&self) -> Vec<String> {
        PREDICTORS
            .iter()
            .flat_map(|name| {
                if self.degree == 1 {
                    vec![name.to_string()]
                } else {
                    (1..=self.degree)
                        .map(|d| format!("{}_poly_{}", name, d))
                        .collect()
                }
            })
            .collect()
    }
}

/// Target vector (hourly precipitation) for a set of rows.
pub fn target(rows: &[Observation]) -> Array1<f64> {
    rows.iter().map(|o| o.precip).collect()
}
