use {
    std::collections::HashSet,
    once_cell::sync::Lazy,
    rake::{Rake, StopWords},
    regex::Regex,
    feedback_core::config::LanguageConfig,
    crate::error::{AnalysisError, Result},
};

static WORD_OR_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?P<word>\w+)|(?P<punctuation>[^\w\s]+)").unwrap());

/// RAKE keyphrase extraction. Works on raw text: punctuation is what splits candidate phrases.
pub struct KeywordExtractor {
    rake: Rake,
}

impl std::fmt::Debug for KeywordExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExtractor").finish_non_exhaustive()
    }
}

impl KeywordExtractor {
    pub fn new(stop_words: HashSet<String>) -> Self {
        let mut rake_stop_words = StopWords::new();
        for word in stop_words {
            rake_stop_words.insert(word.to_lowercase());
        }

        Self {
            rake: Rake::new(rake_stop_words),
        }
    }

    pub fn load(config: &LanguageConfig) -> Result<Self> {
        let language = match config.language.as_str() {
            "russian" => stop_words::LANGUAGE::Russian,
            "english" => stop_words::LANGUAGE::English,
            other => return Err(AnalysisError::LanguageModel(format!("no keyword stop words for language: {}", other))),
        };

        let mut stop_words: HashSet<String> = stop_words::get(language).into_iter().map(|word| word.to_string()).collect();
        stop_words.extend(config.extra_stop_words.iter().cloned());

        Ok(Self::new(stop_words))
    }

    /// Up to `max_phrases` distinct candidate phrases, best first; equal scores keep text order.
    pub fn extract_keywords(&self, text: &str, max_phrases: usize) -> Vec<String> {
        if max_phrases == 0 {
            return Vec::new();
        }

        let fragments = fragments(text);
        if fragments.is_empty() {
            return Vec::new();
        }

        // rake splits sentences on punctuation only, so fragments are rejoined with full stops
        let ranked = self.rake.run(&fragments.join(". "));
        let haystack = format!(" {} ", fragments.join(" | "));

        let mut seen = HashSet::new();
        let mut keywords: Vec<(usize, f64, String)> = ranked.into_iter()
            .filter(|keyword| seen.insert(keyword.keyword.clone()))
            .map(|keyword| (first_occurrence(&haystack, &keyword.keyword), keyword.score, keyword.keyword))
            .collect();

        keywords.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        keywords.into_iter()
            .take(max_phrases)
            .map(|(_, _, keyword)| keyword)
            .collect()
    }
}

/// Lowercased word runs of `text`, one per stretch between punctuation.
fn fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for captures in WORD_OR_PUNCTUATION.captures_iter(text) {
        match captures.name("word") {
            Some(word) => current.push(word.as_str().to_lowercase()),
            None => if !current.is_empty() {
                fragments.push(current.join(" "));
                current.clear();
            },
        }
    }

    if !current.is_empty() {
        fragments.push(current.join(" "));
    }

    fragments
}

fn first_occurrence(haystack: &str, phrase: &str) -> usize {
    haystack.find(&format!(" {} ", phrase)).unwrap_or(usize::MAX)
}
