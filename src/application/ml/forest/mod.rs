//! Random forest classifier: bagged CART trees voting on the outcome class.

mod classifier;
mod params;
mod tree;

pub use classifier::RandomForestClassifier;
pub use params::{ForestParams, MaxFeatures};
pub use tree::{DecisionTree, Node};

/// Interface for fitted classifiers used at inference time.
///
/// Rows are read purely by position; callers are responsible for laying features
/// out in the order the classifier was fitted with.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Number of columns each row must have.
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Probability per class index: non-negative, summing to 1.
    fn predict_proba(&self, row: &[f64]) -> Vec<f64>;

    /// Most probable class index; ties go to the lower index.
    fn predict(&self, row: &[f64]) -> usize {
        let proba = self.predict_proba(row);
        let mut best = 0;
        for (class, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = class;
            }
        }
        best
    }
}
