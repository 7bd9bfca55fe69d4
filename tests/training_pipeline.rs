mod common;

use loan_approval::application::ml::dataset::Dataset;
use loan_approval::application::ml::forest::ForestParams;
use loan_approval::application::ml::{TrainingOptions, TrainingPipeline};
use loan_approval::domain::errors::TrainingError;
use loan_approval::domain::ml::feature_registry::{FEATURE_NAMES, FeatureSchema};
use loan_approval::infrastructure::ArtifactStore;

fn pipeline(n_trees: usize) -> TrainingPipeline {
    TrainingPipeline::new(TrainingOptions {
        test_size: 0.2,
        params: ForestParams::default().with_n_trees(n_trees),
    })
}

#[test]
fn test_end_to_end_training_writes_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let csv = common::write_dataset(dir.path(), 300, 7);
    let store = ArtifactStore::new(dir.path().join("models").join("loan_model_rf.json"));

    let report = pipeline(30).run(&csv, &store).unwrap();

    assert_eq!(report.n_rows, 300);
    assert_eq!(report.split.test.len(), 60);
    assert_eq!(report.split.train.len(), 240);
    assert_eq!(report.artifact_path.as_deref(), Some(store.path()));
    assert!(store.exists());
    assert!(report.evaluation.accuracy > 0.85, "{:?}", report.evaluation);

    let names: Vec<&str> = report
        .feature_importances
        .iter()
        .map(|w| w.feature.as_str())
        .collect();
    assert_eq!(names, FEATURE_NAMES.to_vec());

    let total: f64 = report.feature_importances.iter().map(|w| w.weight).sum();
    assert!((total - 1.0).abs() < 1e-9);

    // The label only depends on the credit score
    let top = report
        .feature_importances
        .iter()
        .max_by(|a, b| a.weight.total_cmp(&b.weight))
        .unwrap();
    assert_eq!(top.feature, "cibil_score");

    let loaded = store.load().unwrap();
    assert_eq!(loaded.schema(), &FeatureSchema::canonical());
}

#[test]
fn test_same_seed_reproduces_split_and_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let csv = common::write_dataset(dir.path(), 200, 11);
    let dataset = Dataset::load_csv(&csv).unwrap();

    let (first_model, first) = pipeline(20).fit(&dataset).unwrap();
    let (second_model, second) = pipeline(20).fit(&dataset).unwrap();

    assert_eq!(first.split, second.split);
    assert_eq!(first.evaluation, second.evaluation);
    assert_eq!(first_model.classifier(), second_model.classifier());
}

#[test]
fn test_padded_and_clean_files_train_identically() {
    let dir = tempfile::tempdir().unwrap();
    let rows = common::synthetic_rows(150, 3);
    let clean = common::write_csv(dir.path(), "clean.csv", &common::to_csv(&rows, false));
    let padded = common::write_csv(dir.path(), "padded.csv", &common::to_csv(&rows, true));

    let clean = Dataset::load_csv(&clean).unwrap();
    let padded = Dataset::load_csv(&padded).unwrap();
    assert_eq!(clean, padded);

    let (a, _) = pipeline(10).fit(&clean).unwrap();
    let (b, _) = pipeline(10).fit(&padded).unwrap();
    assert_eq!(a.classifier(), b.classifier());
}

#[test]
fn test_unmappable_category_writes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = common::synthetic_rows(50, 5);
    rows[17][2] = "PhD".to_string();
    let csv = common::write_csv(dir.path(), "loans.csv", &common::to_csv(&rows, true));
    let store = ArtifactStore::new(dir.path().join("loan_model_rf.json"));

    match pipeline(5).run(&csv, &store) {
        Err(TrainingError::UnmappableCategory { column, value, .. }) => {
            assert_eq!(column, "education");
            assert_eq!(value, "PhD");
        }
        other => panic!("expected UnmappableCategory, got {:?}", other.map(|_| ())),
    }
    assert!(!store.exists());
}

#[test]
fn test_missing_feature_column_writes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let score_col = common::HEADER
        .iter()
        .position(|h| *h == "cibil_score")
        .unwrap();
    let header: Vec<&str> = common::HEADER
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != score_col)
        .map(|(_, h)| *h)
        .collect();
    let mut content = header.join(",");
    content.push('\n');
    for mut row in common::synthetic_rows(50, 9) {
        row.remove(score_col);
        content.push_str(&row.join(","));
        content.push('\n');
    }
    let csv = common::write_csv(dir.path(), "loans.csv", &content);
    let store = ArtifactStore::new(dir.path().join("loan_model_rf.json"));

    match pipeline(5).run(&csv, &store) {
        Err(TrainingError::MissingColumn { column }) => assert_eq!(column, "cibil_score"),
        other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
    }
    assert!(!store.exists());
}

#[test]
fn test_missing_dataset_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("loan_model_rf.json"));

    assert!(matches!(
        pipeline(5).run(&dir.path().join("nope.csv"), &store),
        Err(TrainingError::DatasetUnreadable { .. })
    ));
    assert!(!store.exists());
}
