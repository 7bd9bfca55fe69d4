use super::{DEFAULT_MODEL_PATH, parse_or, process_env};
use anyhow::Result;
use std::path::PathBuf;

/// Settings for the prediction CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceEnvConfig {
    pub model_path: PathBuf,
}

impl InferenceEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            model_path: parse_or(&lookup, "LOAN_MODEL_PATH", PathBuf::from(DEFAULT_MODEL_PATH))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_model_path_default_and_override() {
        let config = InferenceEnvConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.model_path, PathBuf::from("data/loan_model_rf.json"));

        let config =
            InferenceEnvConfig::from_lookup(lookup_from(&[("LOAN_MODEL_PATH", "models/a.json")]))
                .unwrap();
        assert_eq!(config.model_path, PathBuf::from("models/a.json"));
    }
}
