use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("{component} has not been fitted or loaded")]
    NotFitted { component: &'static str },

    #[error("feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("failed to load language model: {0}")]
    LanguageModel(String),

    #[error("training failed: {0}")]
    Training(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
