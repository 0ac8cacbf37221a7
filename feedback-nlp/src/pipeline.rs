use {
    std::{fs, path::Path},
    anyhow::{Context, Result as AnyResult},
    serde::{Serialize, Deserialize},
    tracing::{info, warn},
    feedback_core::{
        config::PipelineConfig,
        models::{AnalysisResult, Comment, FeedbackId, TopicWeight},
    },
    crate::{
        error::{AnalysisError, Result},
        keywords::KeywordExtractor,
        lemmatization::LanguageModel,
        normalization::normalize,
        sentiment::SentimentClassifier,
        tokenization::tokenize,
        topics::TopicModel,
        vectorizer::{FeatureVector, TfidfVectorizer},
    },
};

/// Models fitted offline on a corpus. Read-only once a pipeline is built from them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FittedArtifacts {
    pub vectorizer: TfidfVectorizer,
    pub classifier: SentimentClassifier,
    pub topic_model: TopicModel,
}

impl FittedArtifacts {
    /// Artifacts with every model still waiting for `fit`.
    pub fn unfitted(config: &PipelineConfig) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(&config.vectorizer),
            classifier: SentimentClassifier::new(&config.classifier),
            topic_model: TopicModel::new(&config.topics),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let content = fs::read(path)
            .with_context(|| format!("failed to read artifacts from {}", path.display()))?;

        let artifacts: Self = serde_json::from_slice(&content)
            .with_context(|| format!("failed to parse artifacts in {}", path.display()))?;
        artifacts.validate()
            .with_context(|| format!("inconsistent artifacts in {}", path.display()))?;

        Ok(artifacts)
    }

    /// Checks every fitted model on its own, then the vectorizer width against the classifier.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.topic_model.validate()?;

        if let (Some(vocabulary), Some(classifier)) = (self.vectorizer.vocabulary_size(), self.classifier.dimension()) {
            if vocabulary != classifier {
                return Err(AnalysisError::DimensionMismatch { expected: classifier, got: vocabulary });
            }
        }

        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> AnyResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_vec(self).context("failed to serialize artifacts")?;

        fs::write(path, content)
            .with_context(|| format!("failed to write artifacts to {}", path.display()))
    }
}

/// Everything one `analyze` call needs. Built once at startup, then shared by reference.
pub struct PipelineContext {
    language_model: Box<dyn LanguageModel>,
    artifacts: FittedArtifacts,
    keyword_extractor: KeywordExtractor,
    max_phrases: usize,
}

impl PipelineContext {
    pub fn new(
        language_model: Box<dyn LanguageModel>,
        artifacts: FittedArtifacts,
        keyword_extractor: KeywordExtractor,
        max_phrases: usize,
    ) -> Result<Self> {
        artifacts.validate()?;

        info!(
            "pipeline ready: vectorizer fitted: {}, classifier fitted: {}, topic model fitted: {}",
            artifacts.vectorizer.is_fitted(),
            artifacts.classifier.is_fitted(),
            artifacts.topic_model.is_fitted(),
        );

        if max_phrases == 0 {
            warn!("max_phrases is 0, keyword extraction is disabled");
        }

        Ok(Self {
            language_model,
            artifacts,
            keyword_extractor,
            max_phrases,
        })
    }

    pub fn artifacts(&self) -> &FittedArtifacts {
        &self.artifacts
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize(raw)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(self.language_model.as_ref(), text)
    }

    pub fn vectorize(&self, tokens: &[String]) -> Result<FeatureVector> {
        self.artifacts.vectorizer.transform(tokens)
    }

    pub fn score(&self, vector: &FeatureVector) -> Result<f64> {
        self.artifacts.classifier.score(vector)
    }

    pub fn topics_for(&self, tokens: &[String]) -> Result<Vec<TopicWeight>> {
        self.artifacts.topic_model.topics_for(tokens)
    }

    pub fn extract_keywords(&self, text: &str, max_phrases: usize) -> Vec<String> {
        self.keyword_extractor.extract_keywords(text, max_phrases)
    }

    pub fn analyze(&self, raw_comment: &str, feedback_id: impl Into<FeedbackId>) -> Result<AnalysisResult> {
        self.analyze_with(raw_comment, feedback_id, self.max_phrases)
    }

    pub fn analyze_comment(&self, comment: &Comment) -> Result<AnalysisResult> {
        self.analyze(&comment.text, comment.id.clone())
    }

    pub fn analyze_with(&self, raw_comment: &str, feedback_id: impl Into<FeedbackId>, max_phrases: usize) -> Result<AnalysisResult> {
        let normalized = self.normalize(raw_comment);
        let tokens = self.tokenize(&normalized);
        let clean_text = tokens.join(" ");

        let vector = self.vectorize(&tokens)?;
        let sentiment_score = self.score(&vector)?;
        let topics = self.topics_for(&tokens)?;

        // keyphrases come from the raw comment, normalization would erase the phrase boundaries
        let keywords = self.extract_keywords(raw_comment, max_phrases);

        Ok(AnalysisResult {
            feedback_id: feedback_id.into(),
            clean_text,
            sentiment_score,
            topics,
            keywords,
        })
    }
}
