use crate::domain::errors::TrainingError;
use serde::{Deserialize, Serialize};

/// Number of candidate features drawn at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    All,
    Sqrt,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Fixed(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Random forest hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.n_trees == 0 {
            return Err(TrainingError::InvalidParameter {
                name: "n_trees",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_samples_split < 2 {
            return Err(TrainingError::InvalidParameter {
                name: "min_samples_split",
                reason: format!("must be at least 2, got {}", self.min_samples_split),
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainingError::InvalidParameter {
                name: "min_samples_leaf",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(TrainingError::InvalidParameter {
                name: "max_depth",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        if self.max_features == MaxFeatures::Fixed(0) {
            return Err(TrainingError::InvalidParameter {
                name: "max_features",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_of_eleven_features_is_three() {
        assert_eq!(MaxFeatures::Sqrt.resolve(11), 3);
        assert_eq!(MaxFeatures::All.resolve(11), 11);
        assert_eq!(MaxFeatures::Fixed(40).resolve(11), 11);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn test_validate_rejects_degenerate_params() {
        assert!(ForestParams::default().validate().is_ok());
        assert!(ForestParams::default().with_n_trees(0).validate().is_err());
        assert!(
            ForestParams::default()
                .with_min_samples_split(1)
                .validate()
                .is_err()
        );
        assert!(
            ForestParams::default()
                .with_max_depth(Some(0))
                .validate()
                .is_err()
        );
    }
}
