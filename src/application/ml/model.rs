use super::forest::{ProbabilisticClassifier, RandomForestClassifier};
use crate::domain::applicant::{BinaryCategory, LoanStatus};
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::prediction::FeatureWeight;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub trained_at: DateTime<Utc>,
    /// Held-out accuracy in [0, 1].
    pub accuracy: f64,
    pub seed: u64,
    pub n_train: usize,
    pub n_test: usize,
}

/// A fitted classifier bundled with the ordered feature names it was fitted on.
///
/// Immutable once built; share it behind an `Arc` if several owners need it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    schema: FeatureSchema,
    classifier: RandomForestClassifier,
    metadata: TrainingMetadata,
}

impl TrainedModel {
    /// Bundles the parts after checking that they describe the same feature space.
    pub fn new(
        schema: FeatureSchema,
        classifier: RandomForestClassifier,
        metadata: TrainingMetadata,
    ) -> Result<Self, String> {
        if schema.is_empty() {
            return Err("feature schema is empty".to_string());
        }
        if let Some(dup) = schema.find_duplicate() {
            return Err(format!("feature '{}' appears twice in the schema", dup));
        }
        if classifier.n_features() != schema.len() {
            return Err(format!(
                "classifier expects {} features but the schema lists {}",
                classifier.n_features(),
                schema.len()
            ));
        }
        let n_outcomes = LoanStatus::VARIANTS.len();
        if classifier.n_classes() != n_outcomes {
            return Err(format!(
                "classifier has {} classes, expected {}",
                classifier.n_classes(),
                n_outcomes
            ));
        }
        classifier.check_structure()?;
        Ok(Self {
            schema,
            classifier,
            metadata,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn classifier(&self) -> &RandomForestClassifier {
        &self.classifier
    }

    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// Importance weights paired with their feature names, in schema order.
    pub fn feature_importances(&self) -> Vec<FeatureWeight> {
        self.schema
            .names()
            .iter()
            .zip(self.classifier.feature_importances())
            .map(|(feature, weight)| FeatureWeight {
                feature: feature.clone(),
                weight,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::forest::ForestParams;

    fn metadata() -> TrainingMetadata {
        TrainingMetadata {
            trained_at: Utc::now(),
            accuracy: 1.0,
            seed: 42,
            n_train: 4,
            n_test: 1,
        }
    }

    fn forest(n_features: usize) -> RandomForestClassifier {
        let x: Vec<Vec<f64>> = (0..6)
            .map(|i| (0..n_features).map(|f| (i * (f + 1)) as f64).collect())
            .collect();
        let y = vec![0, 0, 0, 1, 1, 1];
        RandomForestClassifier::fit(&x, &y, 2, ForestParams::default().with_n_trees(3)).unwrap()
    }

    #[test]
    fn test_rejects_schema_length_mismatch() {
        let schema = FeatureSchema::new(vec!["a".to_string()]);
        let err = TrainedModel::new(schema, forest(2), metadata()).unwrap_err();
        assert!(err.contains("expects 2 features"));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let schema = FeatureSchema::new(vec!["a".to_string(), "a".to_string()]);
        assert!(TrainedModel::new(schema, forest(2), metadata()).is_err());
    }

    #[test]
    fn test_importances_are_named_in_schema_order() {
        let schema = FeatureSchema::new(vec!["first".to_string(), "second".to_string()]);
        let model = TrainedModel::new(schema, forest(2), metadata()).unwrap();

        let weights = model.feature_importances();
        assert_eq!(weights[0].feature, "first");
        assert_eq!(weights[1].feature, "second");
        let total: f64 = weights.iter().map(|w| w.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
