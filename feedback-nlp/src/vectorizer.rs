use {
    std::collections::{BTreeMap, HashMap, HashSet},
    once_cell::sync::Lazy,
    regex::Regex,
    serde::{Serialize, Deserialize},
    tracing::info,
    feedback_core::config::VectorizerConfig,
    crate::error::{AnalysisError, Result},
};

static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Sparse vector over a fitted vocabulary. Entries are sorted by index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TfidfVectorizer {
    min_df: usize,
    max_df: f64,
    ngram_range: (usize, usize),
    vocabulary: Option<Vocabulary>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct Vocabulary {
    terms: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl FeatureVector {
    /// Fails when an entry lies outside `dimension`.
    pub fn new(dimension: usize, mut entries: Vec<(usize, f64)>) -> Result<Self> {
        if let Some((index, _)) = entries.iter().find(|(index, _)| *index >= dimension) {
            return Err(AnalysisError::DimensionMismatch { expected: dimension, got: index + 1 });
        }

        entries.sort_by_key(|(index, _)| *index);
        Ok(Self {
            dimension,
            entries,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, value)| *value == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, value)| value * value).sum::<f64>().sqrt()
    }
}

impl TfidfVectorizer {
    pub fn new(config: &VectorizerConfig) -> Self {
        Self {
            min_df: config.min_df,
            max_df: config.max_df,
            ngram_range: config.ngram_range,
            vocabulary: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn vocabulary_size(&self) -> Option<usize> {
        self.vocabulary.as_ref().map(|vocabulary| vocabulary.idf.len())
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.as_ref().and_then(|vocabulary| vocabulary.terms.get(term).copied())
    }

    /// Checks that every vocabulary index has an idf weight. Deserialized vectorizers are not
    /// otherwise trusted.
    pub fn validate(&self) -> Result<()> {
        let vocabulary = match &self.vocabulary {
            Some(vocabulary) => vocabulary,
            None => return Ok(()),
        };

        let expected = vocabulary.idf.len();
        if vocabulary.terms.len() != expected {
            return Err(AnalysisError::DimensionMismatch { expected, got: vocabulary.terms.len() });
        }
        if let Some(index) = vocabulary.terms.values().copied().find(|index| *index >= expected) {
            return Err(AnalysisError::DimensionMismatch { expected, got: index + 1 });
        }

        Ok(())
    }

    /// Learns the n-gram vocabulary and idf weights. Every token sequence is one document.
    pub fn fit(&mut self, corpus: &[Vec<String>]) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(AnalysisError::Training(format!("invalid ngram range: ({}, {})", min_n, max_n)));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(AnalysisError::Training(format!("max_df must be in (0, 1], got {}", self.max_df)));
        }
        if corpus.is_empty() {
            return Err(AnalysisError::Training("cannot fit vectorizer on an empty corpus".to_owned()));
        }

        let total_documents = corpus.len();
        let max_document_count = self.max_df * total_documents as f64;
        if max_document_count < self.min_df as f64 {
            return Err(AnalysisError::Training(format!(
                "max_df {} corresponds to fewer documents than min_df {}",
                self.max_df,
                self.min_df,
            )));
        }

        let mut document_frequencies: HashMap<String, usize> = HashMap::new();
        for tokens in corpus {
            let terms: HashSet<String> = self.analyze(&tokens.join(" ")).into_iter().collect();
            for term in terms {
                *document_frequencies.entry(term).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(String, usize)> = document_frequencies.into_iter()
            .filter(|(_, df)| *df >= self.min_df && (*df as f64) <= max_document_count)
            .collect();
        if kept.is_empty() {
            return Err(AnalysisError::Training("no terms remain after document frequency pruning".to_owned()));
        }
        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let mut terms = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, df)) in kept.into_iter().enumerate() {
            terms.insert(term, index);
            idf.push(((1.0 + total_documents as f64) / (1.0 + df as f64)).ln() + 1.0);
        }

        info!("fitted vectorizer: {} terms over {} documents", idf.len(), total_documents);
        self.vocabulary = Some(Vocabulary { terms, idf });

        Ok(())
    }

    /// TF-IDF weights of the in-vocabulary n-grams of `tokens`, L2-normalized.
    pub fn transform(&self, tokens: &[String]) -> Result<FeatureVector> {
        let vocabulary = self.vocabulary.as_ref().ok_or(AnalysisError::NotFitted { component: "vectorizer" })?;

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(&tokens.join(" ")) {
            if let Some(index) = vocabulary.terms.get(&term) {
                *counts.entry(*index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts.into_iter()
            .map(|(index, count)| (index, count * vocabulary.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, value)| value * value).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= norm;
            }
        }

        FeatureVector::new(vocabulary.idf.len(), entries)
    }

    fn analyze(&self, document: &str) -> Vec<String> {
        let document = document.to_lowercase();
        let words: Vec<&str> = TERM.find_iter(&document).map(|m| m.as_str()).collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 0 || n > words.len() {
                continue;
            }
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }

        terms
    }
}
