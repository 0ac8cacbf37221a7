use {
    std::{collections::{HashMap, HashSet}, fs, sync::Arc},
    tracing::info,
    rust_stemmers::{Algorithm, Stemmer},
    unicode_segmentation::UnicodeSegmentation,
    feedback_core::config::LanguageConfig,
    crate::error::{AnalysisError, Result},
};

/// A token as seen by the linguistic model, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticToken {
    pub text: String,
    pub lemma: String,
    pub is_alpha: bool,
    pub is_stop: bool,
}

/// Loaded once at startup and shared read-only between requests.
pub trait LanguageModel: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<LinguisticToken>;
}

/// Dictionary lemmatizer with a Snowball stemmer fallback for words the dictionary does not know.
#[derive(Clone)]
pub struct DictionaryLanguageModel {
    stop_words: HashSet<String>,
    lemmas: HashMap<String, String>,
    stemmer: Option<Arc<Stemmer>>,
}

impl std::fmt::Debug for DictionaryLanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryLanguageModel")
            .field("stop_words", &self.stop_words.len())
            .field("lemmas", &self.lemmas.len())
            .field("stemmer", &self.stemmer.is_some())
            .finish()
    }
}

impl DictionaryLanguageModel {
    pub fn load(config: &LanguageConfig) -> Result<Self> {
        let (algorithm, stop_words_language) = match config.language.as_str() {
            "russian" => (Algorithm::Russian, stop_words::LANGUAGE::Russian),
            "english" => (Algorithm::English, stop_words::LANGUAGE::English),
            other => return Err(AnalysisError::LanguageModel(format!("unsupported language: {}", other))),
        };

        let mut stop_words: HashSet<String> = stop_words::get(stop_words_language)
            .into_iter()
            .map(|word| word.to_lowercase())
            .collect();
        stop_words.extend(config.extra_stop_words.iter().map(|word| word.to_lowercase()));

        let lemmas = match &config.lemma_dictionary {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|err| AnalysisError::LanguageModel(format!("failed to read lemma dictionary {}: {}", path, err)))?;
                parse_lemma_dictionary(&content)?
            },
            None => HashMap::new(),
        };

        info!(
            "loaded {} language model: {} stop words, {} dictionary lemmas",
            config.language,
            stop_words.len(),
            lemmas.len(),
        );

        Ok(Self::new(
            stop_words,
            lemmas,
            if config.stem_unknown_words { Some(algorithm) } else { None },
        ))
    }

    pub fn new(stop_words: HashSet<String>, lemmas: HashMap<String, String>, stemmer: Option<Algorithm>) -> Self {
        Self {
            stop_words,
            lemmas,
            stemmer: stemmer.map(|algorithm| Arc::new(Stemmer::create(algorithm))),
        }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if let Some(lemma) = self.lemmas.get(&word) {
            return lemma.clone();
        }

        match &self.stemmer {
            Some(stemmer) => stemmer.stem(&word).into_owned(),
            None => word,
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }
}

impl LanguageModel for DictionaryLanguageModel {
    fn analyze(&self, text: &str) -> Vec<LinguisticToken> {
        text.split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| LinguisticToken {
                text: segment.to_owned(),
                lemma: self.lemmatize(segment),
                is_alpha: segment.chars().all(char::is_alphabetic),
                is_stop: self.is_stop_word(segment),
            })
            .collect()
    }
}

/// One `word<TAB>lemma` pair per line, `#` starts a comment line.
fn parse_lemma_dictionary(content: &str) -> Result<HashMap<String, String>> {
    let mut lemmas = HashMap::new();

    for (line_number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split('\t');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(word), Some(lemma), None) if !word.trim().is_empty() && !lemma.trim().is_empty() => {
                lemmas.insert(word.trim().to_lowercase(), lemma.trim().to_lowercase());
            },
            _ => return Err(AnalysisError::LanguageModel(format!("malformed lemma dictionary line {}: {:?}", line_number + 1, line))),
        }
    }

    Ok(lemmas)
}
