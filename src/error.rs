// Error taxonomy for the pipeline. Schema problems abort the run before any
// row work; row-level cleaning failures are dropped and counted; degenerate
// metrics are not errors at all (they surface as `None` in the results).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("required column '{0}' is missing from the input header")]
    MissingColumn(String),

    #[error("unparseable precipitation value '{0}'")]
    BadPrecip(String),

    #[error("no usable rows")]
    EmptyDataset,

    #[error("feature '{0}' is constant in the training split, cannot standardize")]
    ConstantFeature(&'static str),

    #[error("polynomial degree must be 1 or 2, got {0}")]
    BadDegree(usize),

    #[error("neighbor count k must be at least 1")]
    BadNeighborCount,

    #[error("feature matrix has {rows} rows but {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("predicted and actual lengths differ ({predicted} vs {actual})")]
    LengthMismatch { predicted: usize, actual: usize },

    #[error("cannot evaluate metrics on an empty sample")]
    EmptySample,
}
