pub mod bag_of_words;
pub mod error;
pub mod keywords;
pub mod lemmatization;
pub mod normalization;
pub mod pipeline;
pub mod sentiment;
pub mod tokenization;
pub mod topics;
pub mod training;
pub mod vectorizer;

pub use {
    error::{AnalysisError, Result},
    pipeline::{FittedArtifacts, PipelineContext},
};
