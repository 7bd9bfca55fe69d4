//! Configuration loading from environment variables.
//!
//! Values come from the process environment (after `.env` is loaded with
//! `dotenvy`). Every reader also accepts an injected lookup so tests never
//! touch the real environment. Command-line flags override these values.

mod inference_env_config;
mod training_env_config;

pub use inference_env_config::InferenceEnvConfig;
pub use training_env_config::TrainingEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_DATASET_PATH: &str = "data/loan_approval_dataset.csv";
pub const DEFAULT_MODEL_PATH: &str = "data/loan_model_rf.json";

pub(crate) fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads `key`, falling back to `default` when it is unset or blank.
pub(crate) fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match parse_opt(lookup, key)? {
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

/// Reads an optional `key`. Unset and blank both mean `None`.
pub(crate) fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .context(format!("Failed to parse {}", key)),
        _ => Ok(None),
    }
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}
