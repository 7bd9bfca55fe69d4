use crate::domain::errors::LoanError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Canonical applicant feature names, in dataset column order.
/// A trained model records its own ordered copy in the artifact; inference
/// always follows the recorded order, never this constant.
pub const FEATURE_NAMES: &[&str] = &[
    "no_of_dependents",
    "education",
    "self_employed",
    "income_annum",
    "loan_amount",
    "loan_term",
    "cibil_score",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
];

/// Row identifier column, dropped before fitting.
pub const ID_COLUMN: &str = "loan_id";

/// Target column, dropped from the features and used as the label.
pub const LABEL_COLUMN: &str = "loan_status";

/// Ordered feature names a trained model expects.
///
/// The classifier reads rows purely by position, so this list is the only thing
/// tying a column index back to its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Schema matching the canonical dataset layout.
    pub fn canonical() -> Self {
        Self::new(FEATURE_NAMES.iter().map(|n| n.to_string()).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns the first duplicated name, if any.
    pub fn find_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.names
            .iter()
            .find(|n| !seen.insert(n.as_str()))
            .map(String::as_str)
    }

    /// Lays named values out in schema order.
    ///
    /// The named set must equal the schema set exactly. Missing and unexpected
    /// names are both reported so the caller can fix the record in one pass.
    pub fn vectorize(&self, named: &BTreeMap<String, f64>) -> Result<Vec<f64>, LoanError> {
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|n| !named.contains_key(n.as_str()))
            .cloned()
            .collect();
        let unexpected: Vec<String> = named
            .keys()
            .filter(|k| self.index_of(k).is_none())
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(LoanError::SchemaMismatch {
                missing,
                unexpected,
            });
        }

        Ok(self.names.iter().map(|n| named[n.as_str()]).collect())
    }
}
