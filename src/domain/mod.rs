// Applicant records and categorical encodings
pub mod applicant;

// Rule-based decision explanations
pub mod explanation;

// Feature schema
pub mod ml;

// Prediction output types
pub mod prediction;

// Domain-specific error types
pub mod errors;
