use {
    tracing::info,
    feedback_core::{config::PipelineConfig, models::LabeledComment},
    crate::{
        error::{AnalysisError, Result},
        lemmatization::LanguageModel,
        normalization::normalize,
        pipeline::FittedArtifacts,
        tokenization::tokenize,
    },
};

/// Fits vectorizer, sentiment classifier and topic model on one corpus.
/// The classifier only sees rows that carry a `recommend` label.
pub fn fit_artifacts(model: &dyn LanguageModel, corpus: &[LabeledComment], config: &PipelineConfig) -> Result<FittedArtifacts> {
    if corpus.is_empty() {
        return Err(AnalysisError::Training("training corpus is empty".to_owned()));
    }

    let token_lists = tokenize_corpus(model, corpus.iter().map(|row| row.text.as_str()));
    let mut artifacts = FittedArtifacts::unfitted(config);

    artifacts.vectorizer.fit(&token_lists)?;

    let mut vectors = Vec::new();
    let mut labels = Vec::new();
    for (row, tokens) in corpus.iter().zip(token_lists.iter()) {
        if let Some(recommend) = row.recommend {
            vectors.push(artifacts.vectorizer.transform(tokens)?);
            labels.push(recommend);
        }
    }
    info!("{} of {} training rows are labeled", labels.len(), corpus.len());
    artifacts.classifier.fit(&vectors, &labels)?;

    artifacts.topic_model.fit(&token_lists)?;

    Ok(artifacts)
}

pub fn tokenize_corpus<'a>(model: &dyn LanguageModel, texts: impl Iterator<Item = &'a str>) -> Vec<Vec<String>> {
    texts.map(|text| tokenize(model, &normalize(text))).collect()
}
