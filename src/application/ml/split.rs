use crate::domain::errors::TrainingError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n_rows` with `seed` and holds out the first `ceil(n_rows * test_size)`
/// indices. The same `(n_rows, test_size, seed)` always yields the same indices.
pub fn train_test_split(
    n_rows: usize,
    test_size: f64,
    seed: u64,
) -> Result<SplitIndices, TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidParameter {
            name: "test_size",
            reason: format!("must be in (0, 1), got {}", test_size),
        });
    }

    let n_test = (n_rows as f64 * test_size).ceil() as usize;
    if n_rows < 2 || n_test >= n_rows {
        return Err(TrainingError::InsufficientRows {
            rows: n_rows,
            required: 2,
        });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}
