use super::forest::ProbabilisticClassifier;
use super::model::TrainedModel;
use crate::domain::applicant::{ApplicantRecord, LoanStatus};
use crate::domain::errors::LoanError;
use crate::domain::explanation::explain;
use crate::domain::ml::feature_registry::FeatureSchema;
use crate::domain::prediction::{ClassProbabilities, FeatureWeight, PredictionResult};
use crate::infrastructure::artifact_store::ArtifactStore;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Runs one record through `classifier`, translating named fields into
/// `schema` order first.
///
/// `schema` must be the one `classifier` was fitted with; `TrainedModel`
/// guarantees this for loaded models.
pub fn predict_with<C: ProbabilisticClassifier + ?Sized>(
    classifier: &C,
    schema: &FeatureSchema,
    record: &ApplicantRecord,
    feature_importances: Vec<FeatureWeight>,
) -> Result<PredictionResult, LoanError> {
    record.validate()?;
    let row = schema.vectorize(&record.named_features())?;
    debug_assert_eq!(row.len(), classifier.n_features());

    let probabilities = ClassProbabilities::from_class_vector(&classifier.predict_proba(&row));
    // Ties resolve to Rejected, matching the classifier's argmax rule.
    let verdict = if probabilities.approved > probabilities.rejected {
        LoanStatus::Approved
    } else {
        LoanStatus::Rejected
    };

    debug!(
        "Verdict {} (approved={:.3}, rejected={:.3})",
        verdict, probabilities.approved, probabilities.rejected
    );

    Ok(PredictionResult {
        verdict,
        probabilities,
        explanations: explain(record),
        feature_importances,
    })
}

/// Serves predictions from one immutable trained model.
#[derive(Debug, Clone)]
pub struct LoanApprovalService {
    model: Arc<TrainedModel>,
    importances: Vec<FeatureWeight>,
}

impl LoanApprovalService {
    pub fn new(model: impl Into<Arc<TrainedModel>>) -> Self {
        let model = model.into();
        let importances = model.feature_importances();
        Self { model, importances }
    }

    /// Loads the artifact at `path`. There is no fallback model: a missing
    /// artifact is returned as `ArtifactNotFound`.
    pub fn load(path: &Path) -> Result<Self, LoanError> {
        Ok(Self::new(ArtifactStore::new(path).load()?))
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn feature_importances(&self) -> &[FeatureWeight] {
        &self.importances
    }

    pub fn predict(&self, record: &ApplicantRecord) -> Result<PredictionResult, LoanError> {
        predict_with(
            self.model.classifier(),
            self.model.schema(),
            record,
            self.importances.clone(),
        )
    }

    /// Predicts from loosely typed named fields, e.g. a parsed JSON object.
    pub fn predict_named(
        &self,
        fields: &BTreeMap<String, serde_json::Value>,
    ) -> Result<PredictionResult, LoanError> {
        self.predict(&ApplicantRecord::from_named_values(fields)?)
    }
}
