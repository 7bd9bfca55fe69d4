use crate::domain::applicant::LoanStatus;
use crate::domain::explanation::Explanation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub rejected: f64,
    pub approved: f64,
}

impl ClassProbabilities {
    /// Reads a per-class probability vector indexed by `LoanStatus::class_index`.
    pub fn from_class_vector(proba: &[f64]) -> Self {
        let at = |status: LoanStatus| proba.get(status.class_index()).copied().unwrap_or(0.0);
        Self {
            rejected: at(LoanStatus::Rejected),
            approved: at(LoanStatus::Approved),
        }
    }

    pub fn of(&self, status: LoanStatus) -> f64 {
        match status {
            LoanStatus::Rejected => self.rejected,
            LoanStatus::Approved => self.approved,
        }
    }
}

/// Normalized contribution of one feature to the ensemble's split quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub verdict: LoanStatus,
    pub probabilities: ClassProbabilities,
    pub explanations: Vec<Explanation>,
    pub feature_importances: Vec<FeatureWeight>,
}

impl PredictionResult {
    pub fn is_approved(&self) -> bool {
        self.verdict == LoanStatus::Approved
    }

    pub fn explanation_messages(&self) -> Vec<&'static str> {
        self.explanations.iter().map(|e| e.message()).collect()
    }
}
