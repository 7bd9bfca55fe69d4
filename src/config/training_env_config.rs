//! Training pipeline settings.

use super::{DEFAULT_DATASET_PATH, DEFAULT_MODEL_PATH, parse_opt, parse_or, process_env};
use crate::application::ml::forest::ForestParams;
use crate::application::ml::trainer::TrainingOptions;
use anyhow::{Result, ensure};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingEnvConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_size: 0.2,
            seed: 42,
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl TrainingEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let test_size = parse_or(&lookup, "LOAN_TEST_SIZE", defaults.test_size)?;
        ensure!(
            test_size > 0.0 && test_size < 1.0,
            "LOAN_TEST_SIZE must be between 0 and 1 (exclusive), got {}",
            test_size
        );

        Ok(Self {
            dataset_path: parse_or(&lookup, "LOAN_DATASET_PATH", defaults.dataset_path)?,
            model_path: parse_or(&lookup, "LOAN_MODEL_PATH", defaults.model_path)?,
            test_size,
            seed: parse_or(&lookup, "LOAN_RANDOM_SEED", defaults.seed)?,
            n_trees: parse_or(&lookup, "LOAN_N_TREES", defaults.n_trees)?,
            max_depth: parse_opt(&lookup, "LOAN_MAX_DEPTH")?,
            min_samples_split: parse_or(
                &lookup,
                "LOAN_MIN_SAMPLES_SPLIT",
                defaults.min_samples_split,
            )?,
        })
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            test_size: self.test_size,
            params: ForestParams::default()
                .with_n_trees(self.n_trees)
                .with_max_depth(self.max_depth)
                .with_min_samples_split(self.min_samples_split)
                .with_seed(self.seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = TrainingEnvConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, TrainingEnvConfig::default());

        let options = config.training_options();
        assert_eq!(options.params.n_trees, 100);
        assert_eq!(options.params.seed, 42);
        assert_eq!(options.params.max_depth, None);
        assert!((options.test_size - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reads_overrides() {
        let config = TrainingEnvConfig::from_lookup(lookup_from(&[
            ("LOAN_DATASET_PATH", "/tmp/loans.csv"),
            ("LOAN_N_TREES", "25"),
            ("LOAN_MAX_DEPTH", "8"),
            ("LOAN_RANDOM_SEED", " 7 "),
            ("LOAN_TEST_SIZE", "0.25"),
        ]))
        .unwrap();

        assert_eq!(config.dataset_path, PathBuf::from("/tmp/loans.csv"));
        assert_eq!(config.n_trees, 25);
        assert_eq!(config.max_depth, Some(8));
        assert_eq!(config.seed, 7);
        assert_eq!(config.training_options().params.seed, 7);
    }

    #[test]
    fn test_blank_max_depth_means_unlimited() {
        let config =
            TrainingEnvConfig::from_lookup(lookup_from(&[("LOAN_MAX_DEPTH", "  ")])).unwrap();
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn test_bad_number_names_the_variable() {
        let err = TrainingEnvConfig::from_lookup(lookup_from(&[("LOAN_N_TREES", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("LOAN_N_TREES"));
    }

    #[test]
    fn test_test_size_out_of_range() {
        let err = TrainingEnvConfig::from_lookup(lookup_from(&[("LOAN_TEST_SIZE", "1.5")]))
            .unwrap_err();
        assert!(err.to_string().contains("LOAN_TEST_SIZE"));
    }
}
