use super::dataset::Dataset;
use super::evaluation::{Evaluation, evaluate};
use super::forest::{ForestParams, RandomForestClassifier};
use super::model::{TrainedModel, TrainingMetadata};
use super::split::{SplitIndices, train_test_split};
use crate::domain::applicant::{BinaryCategory, LoanStatus};
use crate::domain::errors::TrainingError;
use crate::domain::ml::feature_registry::FEATURE_NAMES;
use crate::domain::prediction::FeatureWeight;
use crate::infrastructure::artifact_store::ArtifactStore;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    /// Held-out share of rows, in (0, 1).
    pub test_size: f64,
    /// Forest parameters. `params.seed` also seeds the train/test shuffle.
    pub params: ForestParams,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            params: ForestParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub n_rows: usize,
    /// `(rejected, approved)` row counts over the whole dataset.
    pub class_balance: (usize, usize),
    pub split: SplitIndices,
    pub evaluation: Evaluation,
    pub feature_importances: Vec<FeatureWeight>,
    pub artifact_path: Option<PathBuf>,
}

/// Load, split, fit, evaluate, persist. Any error aborts before the artifact is written.
pub struct TrainingPipeline {
    options: TrainingOptions,
}

impl TrainingPipeline {
    pub fn new(options: TrainingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Runs the whole pipeline and writes the artifact to `store`.
    pub fn run(
        &self,
        dataset_path: &Path,
        store: &ArtifactStore,
    ) -> Result<TrainingReport, TrainingError> {
        let dataset = Dataset::load_csv(dataset_path)?;
        let (model, mut report) = self.fit(&dataset)?;
        store.save(&model)?;
        report.artifact_path = Some(store.path().to_path_buf());
        Ok(report)
    }

    /// Splits and fits in memory without touching the filesystem.
    pub fn fit(&self, dataset: &Dataset) -> Result<(TrainedModel, TrainingReport), TrainingError> {
        let params = self.options.params.clone();
        params.validate()?;
        if let Some(dup) = dataset.schema.find_duplicate() {
            return Err(TrainingError::DuplicateColumn {
                column: dup.to_string(),
            });
        }

        let mut names: Vec<&str> = dataset.schema.names().iter().map(String::as_str).collect();
        names.sort_unstable();
        let mut canonical = FEATURE_NAMES.to_vec();
        canonical.sort_unstable();
        if names != canonical {
            warn!(
                "Dataset features {:?} differ from the applicant record layout; \
                 applicant records will not match this model's schema",
                dataset.schema.names()
            );
        }

        let split = train_test_split(dataset.len(), self.options.test_size, params.seed)?;
        let (x_train, y_train) = dataset.select(&split.train);
        let (x_test, y_test) = dataset.select(&split.test);
        info!(
            "Split {} rows into {} train / {} test (seed {})",
            dataset.len(),
            x_train.len(),
            x_test.len(),
            params.seed
        );

        info!(
            "Training random forest (trees: {}, max depth: {}, min split: {})...",
            params.n_trees,
            params
                .max_depth
                .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
            params.min_samples_split
        );
        let n_classes = LoanStatus::VARIANTS.len();
        let seed = params.seed;
        let classifier = RandomForestClassifier::fit(&x_train, &y_train, n_classes, params)?;

        let evaluation = evaluate(&classifier, &x_test, &y_test);
        info!("Held-out accuracy: {:.2}%", evaluation.accuracy * 100.0);

        let metadata = TrainingMetadata {
            trained_at: Utc::now(),
            accuracy: evaluation.accuracy,
            seed,
            n_train: x_train.len(),
            n_test: x_test.len(),
        };
        let model = TrainedModel::new(dataset.schema.clone(), classifier, metadata).map_err(
            |reason| TrainingError::InvalidParameter {
                name: "feature_schema",
                reason,
            },
        )?;

        let report = TrainingReport {
            n_rows: dataset.len(),
            class_balance: dataset.class_balance(),
            split,
            evaluation,
            feature_importances: model.feature_importances(),
            artifact_path: None,
        };
        Ok((model, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FeatureSchema;

    fn toy_dataset(n: usize) -> Dataset {
        let x: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y = (0..n).map(|i| usize::from(i >= n / 2)).collect();
        Dataset {
            schema: FeatureSchema::new(vec!["score".to_string(), "noise".to_string()]),
            ids: (0..n).map(|i| i.to_string()).collect(),
            x,
            y,
        }
    }

    #[test]
    fn test_fit_reports_split_and_accuracy() {
        let pipeline = TrainingPipeline::new(TrainingOptions {
            params: ForestParams::default().with_n_trees(20),
            ..Default::default()
        });

        let (model, report) = pipeline.fit(&toy_dataset(50)).unwrap();

        assert_eq!(report.n_rows, 50);
        assert_eq!(report.split.test.len(), 10);
        assert_eq!(report.evaluation.confusion.total(), 10);
        assert_eq!(model.metadata().n_train, 40);
        assert_eq!(model.schema().names()[0], "score");
        assert!(report.evaluation.accuracy >= 0.8);
    }

    #[test]
    fn test_rejects_too_few_rows() {
        let pipeline = TrainingPipeline::new(TrainingOptions::default());
        assert!(matches!(
            pipeline.fit(&toy_dataset(1)),
            Err(TrainingError::InsufficientRows { .. })
        ));
    }

    #[test]
    fn test_duplicate_feature_fails_before_fitting() {
        let mut dataset = toy_dataset(10);
        dataset.schema = FeatureSchema::new(vec!["score".to_string(), "score".to_string()]);

        match TrainingPipeline::new(TrainingOptions::default()).fit(&dataset) {
            Err(TrainingError::DuplicateColumn { column }) => assert_eq!(column, "score"),
            other => panic!("expected DuplicateColumn, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_rejects_invalid_params_before_splitting() {
        let pipeline = TrainingPipeline::new(TrainingOptions {
            params: ForestParams::default().with_n_trees(0),
            ..Default::default()
        });
        assert!(matches!(
            pipeline.fit(&toy_dataset(10)),
            Err(TrainingError::InvalidParameter { name: "n_trees", .. })
        ));
    }
}
