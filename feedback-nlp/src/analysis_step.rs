use {
    std::{collections::VecDeque, fs::File, io::{BufWriter, Write}, sync::Arc},
    anyhow::{Context, Result},
    tokio::task::JoinHandle,
    tracing::{info, warn, error},
    feedback_core::{config::AnalysisStepConfig, models::{AnalysisResult, FeedbackId}},
    feedback_nlp::{AnalysisError, PipelineContext},
    crate::{data_loading::load_comments, progress::Progress},
};

type AnalysisHandle = JoinHandle<(FeedbackId, std::result::Result<AnalysisResult, AnalysisError>)>;

/// Analyzes every comment of the input file and writes one json result per line, in input order.
/// A comment that fails is logged and skipped.
pub async fn run_analysis_step(config: &AnalysisStepConfig, context: Arc<PipelineContext>) -> Result<()> {
    info!("running analysis step");

    let comments = load_comments(config.comments_path())?;
    let output_path = config.output_path();
    let mut output = BufWriter::new(
        File::create(&output_path).with_context(|| format!("failed to create {}", output_path))?
    );

    let mut progress = Progress::new("analyzing comments");
    let mut handles: VecDeque<AnalysisHandle> = VecDeque::new();
    let max_in_flight = config.max_in_flight();

    for comment in comments {
        let context = context.clone();
        handles.push_back(tokio::task::spawn_blocking(move || {
            let result = context.analyze_comment(&comment);
            (comment.id, result)
        }));

        while handles.len() >= max_in_flight {
            if let Some(handle) = handles.pop_front() {
                write_result(&mut output, handle, &mut progress).await?;
            }
        }
    }

    while let Some(handle) = handles.pop_front() {
        write_result(&mut output, handle, &mut progress).await?;
    }

    output.flush().with_context(|| format!("failed to write {}", output_path))?;
    progress.finish();

    if progress.total_failed() > 0 {
        warn!("{} of {} comments could not be analyzed", progress.total_failed(), progress.total_processed());
    }

    Ok(())
}

async fn write_result(output: &mut impl Write, handle: AnalysisHandle, progress: &mut Progress) -> Result<()> {
    let (feedback_id, result) = handle.await.context("analysis task panicked")?;

    match result {
        Ok(result) => {
            serde_json::to_writer(&mut *output, &result)?;
            output.write_all(b"\n")?;
            progress.update(true);
        },
        Err(err) => {
            error!("failed to analyze feedback {}: {}", feedback_id, err);
            progress.update(false);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        std::io::Write as _,
        feedback_core::{config::Config, models::LabeledComment},
        feedback_nlp::{
            keywords::KeywordExtractor,
            lemmatization::DictionaryLanguageModel,
            training::fit_artifacts,
            FittedArtifacts,
        },
        super::*,
    };

    const CORPUS: [(&str, bool); 6] = [
        ("Вкусная еда, рекомендую", true),
        ("Вкусная еда и кофе", true),
        ("Кофе вкусный, рекомендую", true),
        ("Грубый официант, долго ждали", false),
        ("Официант грубый, еда холодная", false),
        ("Долго ждали, холодная еда", false),
    ];

    fn stop_words() -> std::collections::HashSet<String> {
        ["и", "очень"].iter().map(|word| word.to_string()).collect()
    }

    fn context(fitted: bool) -> Arc<PipelineContext> {
        let config = Config::from_toml("").unwrap();
        let language_model = DictionaryLanguageModel::new(stop_words(), Default::default(), None);

        let artifacts = if fitted {
            let corpus: Vec<LabeledComment> = CORPUS.iter()
                .enumerate()
                .map(|(id, (text, recommend))| LabeledComment {
                    id: FeedbackId::from(id as i64),
                    text: text.to_string(),
                    recommend: Some(*recommend),
                })
                .collect();
            fit_artifacts(&language_model, &corpus, &config.pipeline).unwrap()
        } else {
            FittedArtifacts::unfitted(&config.pipeline)
        };

        Arc::new(PipelineContext::new(
            Box::new(language_model),
            artifacts,
            KeywordExtractor::new(stop_words()),
            5,
        ).unwrap())
    }

    fn comments_file() -> tempfile::NamedTempFile {
        let mut comments = tempfile::NamedTempFile::new().unwrap();
        comments.write_all("id,text\n1,Очень вкусная еда\nx-2,Кофе\n3,Официант грубый\n".as_bytes()).unwrap();
        comments
    }

    fn step_config(comments: &std::path::Path, output: &std::path::Path, max_in_flight: usize) -> AnalysisStepConfig {
        let config = Config::from_toml(&format!(
            "[steps.analysis]\nenabled = true\ncomments_path = {:?}\noutput_path = {:?}\nmax_in_flight = {}\n",
            comments.display().to_string(),
            output.display().to_string(),
            max_in_flight,
        )).unwrap();
        config.steps().analysis()
    }

    #[tokio::test]
    async fn writes_results_in_input_order() {
        let comments = comments_file();
        let output = tempfile::NamedTempFile::new().unwrap();

        run_analysis_step(&step_config(comments.path(), output.path(), 2), context(true)).await.unwrap();

        let results: Vec<AnalysisResult> = std::fs::read_to_string(output.path())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let ids: Vec<FeedbackId> = results.iter().map(|result| result.feedback_id.clone()).collect();

        assert_eq!(ids, vec![FeedbackId::from(1), FeedbackId::from("x-2"), FeedbackId::from(3)]);
        assert_eq!(results[0].clean_text, "вкусная еда");
        assert_eq!(results[0].keywords, vec!["вкусная еда"]);
        assert!(results.iter().all(|result| result.sentiment_score > 0.0 && result.sentiment_score < 1.0));
    }

    #[tokio::test]
    async fn failed_comments_are_skipped() {
        let comments = comments_file();
        let output = tempfile::NamedTempFile::new().unwrap();

        run_analysis_step(&step_config(comments.path(), output.path(), 1), context(false)).await.unwrap();

        assert_eq!(std::fs::read_to_string(output.path()).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_input_fails_the_step() {
        let output = tempfile::NamedTempFile::new().unwrap();
        let config = step_config(std::path::Path::new("/nonexistent/comments.csv"), output.path(), 4);

        assert!(run_analysis_step(&config, context(false)).await.is_err());
    }
}
