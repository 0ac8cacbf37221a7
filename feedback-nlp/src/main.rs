use {
    std::sync::Arc,
    tracing::{info, warn},
    feedback_core::config::Config,
    feedback_nlp::{
        keywords::KeywordExtractor,
        lemmatization::DictionaryLanguageModel,
        FittedArtifacts,
        PipelineContext,
    },
    crate::{
        analysis_step::run_analysis_step,
        training_step::run_training_step,
        utils::init_logging,
    },
};

mod analysis_step;
mod data_loading;
mod progress;
mod training_step;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let (config, config_error) = match config {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    init_logging(config.logging.level());
    if let Some(err) = config_error {
        warn!("failed to read config, using defaults: {}", err);
    }

    info!("feedback analysis");

    let steps = config.steps();
    let training = steps.training();
    let analysis = steps.analysis();
    if !training.enabled && !analysis.enabled {
        warn!("no steps enabled, nothing to do");
        return Ok(());
    }

    let language = config.pipeline.language.clone();
    let language_model = tokio::task::spawn_blocking(move || DictionaryLanguageModel::load(&language)).await??;

    if training.enabled {
        let pipeline = config.pipeline.clone();
        let training_model = language_model.clone();
        tokio::task::spawn_blocking(move || run_training_step(&training, &pipeline, &training_model)).await??;
    }

    if analysis.enabled {
        let artifacts = FittedArtifacts::load(analysis.artifacts_path())?;
        let keyword_extractor = KeywordExtractor::load(&config.pipeline.language)?;
        let context = Arc::new(PipelineContext::new(
            Box::new(language_model),
            artifacts,
            keyword_extractor,
            config.pipeline.keywords.max_phrases,
        )?);

        run_analysis_step(&analysis, context).await?;
    }

    info!("done");

    Ok(())
}
