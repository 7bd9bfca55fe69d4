//! Offline training pipeline and inference service.

pub mod dataset;
pub mod evaluation;
pub mod forest;
pub mod model;
pub mod predictor;
pub mod split;
pub mod trainer;

pub use model::{TrainedModel, TrainingMetadata};
pub use predictor::{LoanApprovalService, predict_with};
pub use trainer::{TrainingOptions, TrainingPipeline, TrainingReport};
