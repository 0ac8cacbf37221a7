use {
    std::{fs::read_to_string, path::Path},
    serde::Deserialize,
};

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub steps: Option<StepsConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingConfig {
    level: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub language: LanguageConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub topics: TopicsConfig,
    #[serde(default)]
    pub keywords: KeywordsConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct LanguageConfig {
    pub language: String,
    pub lemma_dictionary: Option<String>,
    pub extra_stop_words: Vec<String>,
    pub stem_unknown_words: bool,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct VectorizerConfig {
    pub min_df: usize,
    pub max_df: f64,
    pub ngram_range: (usize, usize),
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ClassifierConfig {
    pub c: f64,
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TopicsConfig {
    pub num_topics: usize,
    alpha: Option<f64>,
    pub eta: f64,
    pub iterations: usize,
    pub inference_iterations: usize,
    pub minimum_probability: f64,
    pub seed: u64,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct KeywordsConfig {
    pub max_phrases: usize,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct StepsConfig {
    training: Option<TrainingStepConfig>,
    analysis: Option<AnalysisStepConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrainingStepConfig {
    pub enabled: bool,
    corpus_path: Option<String>,
    artifacts_path: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AnalysisStepConfig {
    pub enabled: bool,
    comments_path: Option<String>,
    artifacts_path: Option<String>,
    output_path: Option<String>,
    max_in_flight: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            pipeline: PipelineConfig::default(),
            steps: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            language: "russian".to_owned(),
            lemma_dictionary: None,
            extra_stop_words: Vec::new(),
            stem_unknown_words: true,
        }
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_df: 2,
            max_df: 0.8,
            ngram_range: (1, 2),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.5,
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            num_topics: 5,
            alpha: None,
            eta: 0.01,
            iterations: 200,
            inference_iterations: 50,
            minimum_probability: 0.01,
            seed: 42,
        }
    }
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            max_phrases: 5,
        }
    }
}

impl Default for TrainingStepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            corpus_path: None,
            artifacts_path: None,
        }
    }
}

impl Default for AnalysisStepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            comments_path: None,
            artifacts_path: None,
            output_path: None,
            max_in_flight: None,
        }
    }
}

impl Config {
    /// Reads `./config.toml`, then `/config/config.toml`.
    pub fn load() -> Result<Self, String> {
        Self::load_from(&["./config.toml", "/config/config.toml"])
    }

    /// Parses the first of `paths` that can be read.
    pub fn load_from<P: AsRef<Path>>(paths: &[P]) -> Result<Self, String> {
        let mut last_error = "no config paths given".to_owned();

        for path in paths {
            match read_to_string(path) {
                Ok(content) => return Self::from_toml(&content),
                Err(err) => last_error = format!("{}: {}", path.as_ref().display(), err),
            }
        }

        Err(last_error)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|err| err.to_string())
    }

    pub fn steps(&self) -> StepsConfig {
        self.steps.as_ref().cloned().unwrap_or_default()
    }
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }
}

impl TopicsConfig {
    /// Symmetric document-topic prior, `1 / num_topics` unless set explicitly.
    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or_else(|| 1.0 / self.num_topics.max(1) as f64)
    }
}

impl StepsConfig {
    pub fn training(&self) -> TrainingStepConfig {
        self.training.as_ref().cloned().unwrap_or_default()
    }

    pub fn analysis(&self) -> AnalysisStepConfig {
        self.analysis.as_ref().cloned().unwrap_or_default()
    }
}

impl TrainingStepConfig {
    pub fn corpus_path(&self) -> String {
        self.corpus_path.as_ref().cloned().unwrap_or("./data/corpus.csv".to_owned())
    }

    pub fn artifacts_path(&self) -> String {
        self.artifacts_path.as_ref().cloned().unwrap_or("./artifacts.json".to_owned())
    }
}

impl AnalysisStepConfig {
    pub fn comments_path(&self) -> String {
        self.comments_path.as_ref().cloned().unwrap_or("./data/comments.csv".to_owned())
    }

    pub fn artifacts_path(&self) -> String {
        self.artifacts_path.as_ref().cloned().unwrap_or("./artifacts.json".to_owned())
    }

    pub fn output_path(&self) -> String {
        self.output_path.as_ref().cloned().unwrap_or("./analysis.json".to_owned())
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.unwrap_or(1024).max(1)
    }
}
