// Seeded train/test split. The only place randomness enters the pipeline;
// every other stage is deterministic given the split.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::preprocess::Observation;

/// Rows the preprocessing pipeline may be fitted on. Keeping this a distinct
/// type from `TestSet` means the fit step cannot be handed held-out data by
/// accident.
#[derive(Debug)]
pub struct TrainSet {
    pub(crate) rows: Vec<Observation>,
}

/// Held-out rows. Only ever transformed and scored, never fitted on.
#[derive(Debug)]
pub struct TestSet {
    pub(crate) rows: Vec<Observation>,
}

impl TrainSet {
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TestSet {
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Random partition into train and test rows. The train side gets the
/// ceiling of `train_fraction * n` so the two sides always cover the whole
/// dataset, and the same seed always reproduces the same membership.
pub fn train_test_split(
    data: &[Observation],
    seed: u64,
    train_fraction: f64,
) -> (TrainSet, TestSet) {
    let mut indices: Vec<usize> = (0..data.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = ((data.len() as f64) * train_fraction).ceil() as usize;

    let rows = |idx: &[usize]| idx.iter().map(|&i| data[i].clone()).collect();
    (
        TrainSet {
            rows: rows(&indices[..n_train]),
        },
        TestSet {
            rows: rows(&indices[n_train..]),
        },
    )
}
