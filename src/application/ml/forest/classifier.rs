use super::params::ForestParams;
use super::tree::{DecisionTree, TreeParams, normalize};
use super::ProbabilisticClassifier;
use crate::domain::errors::TrainingError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bagged ensemble of CART trees. Each tree casts one vote; the class
/// probability is the share of trees voting for that class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fits the forest on `x` rows and class-index labels `y`.
    ///
    /// Per-tree seeds are drawn from `params.seed` before any tree is grown, so
    /// the result does not depend on how rayon schedules the trees.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        params: ForestParams,
    ) -> Result<Self, TrainingError> {
        params.validate()?;
        if x.is_empty() {
            return Err(TrainingError::InsufficientRows {
                rows: 0,
                required: 1,
            });
        }
        if x.len() != y.len() {
            return Err(TrainingError::InvalidParameter {
                name: "y",
                reason: format!("{} labels for {} rows", y.len(), x.len()),
            });
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(TrainingError::InvalidParameter {
                name: "x",
                reason: "rows must share a non-zero feature count".to_string(),
            });
        }
        if let Some(bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(TrainingError::InvalidParameter {
                name: "y",
                reason: format!("label {} outside 0..{}", bad, n_classes),
            });
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: params.max_features.resolve(n_features),
        };
        let mut master = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_trees).map(|_| master.random()).collect();
        let n_rows = x.len();
        let bootstrap = params.bootstrap;

        debug!(
            "Growing {} trees on {} rows x {} features (max_features={})",
            params.n_trees, n_rows, n_features, tree_params.max_features
        );

        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let samples: Vec<usize> = if bootstrap {
                    (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                DecisionTree::fit(x, y, n_classes, samples, &tree_params, &mut rng)
            })
            .collect();

        Ok(Self {
            params,
            n_features,
            n_classes,
            trees,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Per-tree vote counts for `row`.
    pub fn votes(&self, row: &[f64]) -> Vec<usize> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(row)] += 1;
        }
        votes
    }

    /// Checks that the forest has trees and that each one is well formed for
    /// this forest's feature and class counts.
    pub fn check_structure(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_structure(self.n_features, self.n_classes)
                .map_err(|reason| format!("tree {}: {}", i, reason))?;
        }
        Ok(())
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Mean of the per-tree normalized impurity decreases, renormalized to sum to 1.
    /// All zeros when no tree ever split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut sum = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, v) in sum.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        normalize(&sum)
    }
}

impl ProbabilisticClassifier for RandomForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let total = self.trees.len() as f64;
        self.votes(row)
            .into_iter()
            .map(|v| v as f64 / total)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::forest::MaxFeatures;

    /// Label depends on column 0 only; column 1 is noise.
    fn threshold_data(n: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(11);
        let x: Vec<Vec<f64>> = (0..n)
            .map(|_| vec![rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)])
            .collect();
        let y = x.iter().map(|row| usize::from(row[0] > 50.0)).collect();
        (x, y)
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = threshold_data(200);
        let forest =
            RandomForestClassifier::fit(&x, &y, 2, ForestParams::default().with_n_trees(25))
                .unwrap();

        for row in &x {
            let proba = forest.predict_proba(row);
            assert_eq!(proba.len(), 2);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_learns_threshold_far_from_boundary() {
        let (x, y) = threshold_data(300);
        let forest = RandomForestClassifier::fit(&x, &y, 2, ForestParams::default()).unwrap();

        assert_eq!(forest.trees().len(), 100);
        assert_eq!(forest.predict(&[10.0, 50.0]), 0);
        assert_eq!(forest.predict(&[90.0, 50.0]), 1);
        let proba = forest.predict_proba(&[95.0, 5.0]);
        assert!(proba[1] > 0.7, "got {:?}", proba);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = threshold_data(120);
        let params = ForestParams::default().with_n_trees(10).with_seed(7);

        let a = RandomForestClassifier::fit(&x, &y, 2, params.clone()).unwrap();
        let b = RandomForestClassifier::fit(&x, &y, 2, params).unwrap();
        assert_eq!(a, b);

        let c = RandomForestClassifier::fit(
            &x,
            &y,
            2,
            ForestParams::default().with_n_trees(10).with_seed(8),
        )
        .unwrap();
        assert_ne!(a.trees(), c.trees());
    }

    #[test]
    fn test_feature_importances_favor_signal_column() {
        let (x, y) = threshold_data(300);
        let forest = RandomForestClassifier::fit(
            &x,
            &y,
            2,
            ForestParams::default()
                .with_n_trees(30)
                .with_max_features(MaxFeatures::All),
        )
        .unwrap();

        let importances = forest.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_single_class_data_has_zero_importances() {
        let x = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let y = vec![1, 1, 1];
        let forest =
            RandomForestClassifier::fit(&x, &y, 2, ForestParams::default().with_n_trees(5))
                .unwrap();

        assert_eq!(forest.feature_importances(), vec![0.0, 0.0]);
        assert_eq!(forest.predict_proba(&[0.0, 0.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_structure_check() {
        let (x, y) = threshold_data(60);
        let mut forest =
            RandomForestClassifier::fit(&x, &y, 2, ForestParams::default().with_n_trees(4))
                .unwrap();
        assert_eq!(forest.check_structure(), Ok(()));

        forest.trees.clear();
        assert_eq!(
            forest.check_structure(),
            Err("forest has no trees".to_string())
        );
    }

    #[test]
    fn test_rejects_out_of_range_labels() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0, 2];
        assert!(matches!(
            RandomForestClassifier::fit(&x, &y, 2, ForestParams::default()),
            Err(TrainingError::InvalidParameter { name: "y", .. })
        ));
    }
}
