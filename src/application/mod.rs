// Training pipeline and inference service
pub mod ml;
