use {
    anyhow::{Context, Result},
    tracing::info,
    feedback_core::config::{PipelineConfig, TrainingStepConfig},
    feedback_nlp::{lemmatization::LanguageModel, training::fit_artifacts, FittedArtifacts},
    crate::data_loading::load_corpus,
};

const TOP_TERMS_TO_LOG: usize = 8;

pub fn run_training_step(config: &TrainingStepConfig, pipeline: &PipelineConfig, language_model: &dyn LanguageModel) -> Result<FittedArtifacts> {
    info!("running training step");

    let corpus = load_corpus(config.corpus_path())?;
    let artifacts = fit_artifacts(language_model, &corpus, pipeline)
        .context("failed to fit pipeline artifacts")?;

    for topic in 0..artifacts.topic_model.num_topics() {
        let terms = artifacts.topic_model.top_terms(topic, TOP_TERMS_TO_LOG)?
            .into_iter()
            .map(|(term, probability)| format!("{}[{:.3}]", term, probability))
            .collect::<Vec<_>>()
            .join(" ");
        info!("topic {}: {}", topic, terms);
    }

    artifacts.save(config.artifacts_path())?;
    info!("saved pipeline artifacts to {}", config.artifacts_path());

    Ok(artifacts)
}
