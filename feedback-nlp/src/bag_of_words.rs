use {
    std::collections::{BTreeMap, HashMap, HashSet},
    serde::{Serialize, Deserialize},
};

/// Term dictionary of the topic model: token ids in first-seen order plus document frequencies.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Dictionary {
    token_ids: HashMap<String, usize>,
    tokens: Vec<String>,
    document_frequencies: Vec<usize>,
    documents: usize,
}

impl Dictionary {
    pub fn build(corpus: &[Vec<String>]) -> Self {
        let mut dictionary = Self::default();
        for tokens in corpus {
            dictionary.add_document(tokens);
        }
        dictionary
    }

    pub fn add_document(&mut self, tokens: &[String]) {
        let mut seen = HashSet::new();

        for token in tokens {
            let id = match self.token_ids.get(token) {
                Some(id) => *id,
                None => {
                    let id = self.tokens.len();
                    self.token_ids.insert(token.clone(), id);
                    self.tokens.push(token.clone());
                    self.document_frequencies.push(0);
                    id
                },
            };

            if seen.insert(id) {
                self.document_frequencies[id] += 1;
            }
        }

        self.documents += 1;
    }

    /// `(token id, count)` pairs sorted by id. Unknown tokens are dropped.
    pub fn doc2bow(&self, tokens: &[String]) -> Vec<(usize, usize)> {
        let mut counts = BTreeMap::new();
        for token in tokens {
            if let Some(id) = self.token_ids.get(token) {
                *counts.entry(*id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.token_ids.get(token).copied()
    }

    pub fn token(&self, id: usize) -> Option<&str> {
        self.tokens.get(id).map(|token| token.as_str())
    }

    pub fn document_frequency(&self, id: usize) -> Option<usize> {
        self.document_frequencies.get(id).copied()
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// One past the largest id `doc2bow` can return.
    pub fn id_bound(&self) -> usize {
        self.token_ids.values().map(|id| id + 1).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
