use {
    ndarray::{Array1, Array2},
    rand::{Rng, SeedableRng},
    rand_xoshiro::Xoshiro256PlusPlus,
    serde::{Serialize, Deserialize},
    tracing::{debug, info},
    feedback_core::{config::TopicsConfig, models::TopicWeight},
    crate::{
        bag_of_words::Dictionary,
        error::{AnalysisError, Result},
    },
};

/// LDA topic model. Trained with collapsed Gibbs sampling, documents are folded in
/// against the fixed topic-term matrix.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopicModel {
    num_topics: usize,
    alpha: f64,
    eta: f64,
    iterations: usize,
    inference_iterations: usize,
    minimum_probability: f64,
    seed: u64,
    state: Option<TopicModelState>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct TopicModelState {
    dictionary: Dictionary,
    // num_topics x dictionary size, rows sum to 1
    topic_terms: Array2<f64>,
}

impl TopicModel {
    pub fn new(config: &TopicsConfig) -> Self {
        Self {
            num_topics: config.num_topics,
            alpha: config.alpha(),
            eta: config.eta,
            iterations: config.iterations,
            inference_iterations: config.inference_iterations,
            minimum_probability: config.minimum_probability,
            seed: config.seed,
            state: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.state.as_ref().map(|state| &state.dictionary)
    }

    /// Checks the topic-term matrix against `num_topics` and the dictionary.
    pub fn validate(&self) -> Result<()> {
        let state = match &self.state {
            Some(state) => state,
            None => return Ok(()),
        };

        let (rows, columns) = state.topic_terms.dim();
        if rows != self.num_topics {
            return Err(AnalysisError::DimensionMismatch { expected: self.num_topics, got: rows });
        }
        if columns != state.dictionary.len() {
            return Err(AnalysisError::DimensionMismatch { expected: state.dictionary.len(), got: columns });
        }
        if state.dictionary.id_bound() > columns {
            return Err(AnalysisError::DimensionMismatch { expected: columns, got: state.dictionary.id_bound() });
        }

        Ok(())
    }

    pub fn fit(&mut self, corpus: &[Vec<String>]) -> Result<()> {
        if self.num_topics == 0 {
            return Err(AnalysisError::Training("number of topics must be positive".to_owned()));
        }
        if !(self.alpha > 0.0) || !(self.eta > 0.0) {
            return Err(AnalysisError::Training(format!("alpha {} and eta {} must be positive", self.alpha, self.eta)));
        }

        let dictionary = Dictionary::build(corpus);
        if dictionary.is_empty() {
            return Err(AnalysisError::Training("cannot fit topic model on a corpus without tokens".to_owned()));
        }

        let documents: Vec<Vec<usize>> = corpus.iter()
            .map(|tokens| tokens.iter().filter_map(|token| dictionary.id(token)).collect())
            .collect();

        let topics = self.num_topics;
        let terms = dictionary.len();
        let eta_sum = self.eta * terms as f64;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let mut topic_term_counts = Array2::<f64>::zeros((topics, terms));
        let mut document_topic_counts = Array2::<f64>::zeros((documents.len(), topics));
        let mut topic_counts = Array1::<f64>::zeros(topics);
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(documents.len());

        for (document, words) in documents.iter().enumerate() {
            let mut document_assignments = Vec::with_capacity(words.len());
            for &word in words {
                let topic = rng.gen_range(0..topics);
                topic_term_counts[[topic, word]] += 1.0;
                document_topic_counts[[document, topic]] += 1.0;
                topic_counts[topic] += 1.0;
                document_assignments.push(topic);
            }
            assignments.push(document_assignments);
        }

        let mut probabilities = vec![0.0; topics];
        for _ in 0..self.iterations {
            for (document, words) in documents.iter().enumerate() {
                for (position, &word) in words.iter().enumerate() {
                    let old_topic = assignments[document][position];
                    topic_term_counts[[old_topic, word]] -= 1.0;
                    document_topic_counts[[document, old_topic]] -= 1.0;
                    topic_counts[old_topic] -= 1.0;

                    let mut total = 0.0;
                    for topic in 0..topics {
                        let probability = (document_topic_counts[[document, topic]] + self.alpha)
                            * (topic_term_counts[[topic, word]] + self.eta)
                            / (topic_counts[topic] + eta_sum);
                        total += probability;
                        probabilities[topic] = total;
                    }

                    let threshold = rng.gen::<f64>() * total;
                    let new_topic = probabilities.iter()
                        .position(|cumulative| *cumulative > threshold)
                        .unwrap_or(topics - 1);

                    topic_term_counts[[new_topic, word]] += 1.0;
                    document_topic_counts[[document, new_topic]] += 1.0;
                    topic_counts[new_topic] += 1.0;
                    assignments[document][position] = new_topic;
                }
            }
        }

        let mut topic_terms = topic_term_counts.mapv(|count| count + self.eta);
        for (mut row, total) in topic_terms.rows_mut().into_iter().zip(topic_counts.iter()) {
            row /= total + eta_sum;
        }

        info!("fitted topic model: {} topics, {} terms, {} documents", topics, terms, documents.len());
        self.state = Some(TopicModelState { dictionary, topic_terms });

        Ok(())
    }

    /// Topic membership of `tokens`. Topics under the minimum probability are left out;
    /// a document without known tokens gets the prior, which is uniform.
    pub fn topics_for(&self, tokens: &[String]) -> Result<Vec<TopicWeight>> {
        let state = self.state.as_ref().ok_or(AnalysisError::NotFitted { component: "topic model" })?;

        let bow = state.dictionary.doc2bow(tokens);
        let theta = self.infer(&state.topic_terms, &bow);

        Ok(theta.into_iter()
            .enumerate()
            .filter(|(_, weight)| *weight >= self.minimum_probability)
            .map(|(topic, weight)| TopicWeight { topic, weight })
            .collect())
    }

    /// The `n` most probable terms of `topic`.
    pub fn top_terms(&self, topic: usize, n: usize) -> Result<Vec<(String, f64)>> {
        let state = self.state.as_ref().ok_or(AnalysisError::NotFitted { component: "topic model" })?;
        if topic >= self.num_topics {
            return Err(AnalysisError::DimensionMismatch { expected: self.num_topics, got: topic + 1 });
        }

        let mut terms: Vec<(String, f64)> = state.topic_terms.row(topic)
            .iter()
            .enumerate()
            .filter_map(|(id, probability)| state.dictionary.token(id).map(|token| (token.to_owned(), *probability)))
            .collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1));
        terms.truncate(n);

        Ok(terms)
    }

    fn infer(&self, topic_terms: &Array2<f64>, bow: &[(usize, usize)]) -> Vec<f64> {
        let topics = self.num_topics;
        let mut theta = vec![1.0 / topics as f64; topics];
        if bow.is_empty() {
            return theta;
        }

        for _ in 0..self.inference_iterations {
            let mut next = vec![self.alpha; topics];
            for &(word, count) in bow {
                let column = topic_terms.column(word);
                let denominator: f64 = (0..topics).map(|topic| theta[topic] * column[topic]).sum();
                if denominator <= 0.0 {
                    continue;
                }
                for topic in 0..topics {
                    next[topic] += count as f64 * theta[topic] * column[topic] / denominator;
                }
            }

            let total: f64 = next.iter().sum();
            theta = next.into_iter().map(|weight| weight / total).collect();
        }

        debug!("inferred topic distribution {:?} for {} distinct terms", theta, bow.len());
        theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(|token| token.to_owned()).collect()
    }

    fn config() -> TopicsConfig {
        toml_config("num_topics = 2\nalpha = 0.5\niterations = 200\nseed = 7")
    }

    fn toml_config(content: &str) -> TopicsConfig {
        let config = feedback_core::config::Config::from_toml(&format!("[pipeline.topics]\n{}", content)).unwrap();
        config.pipeline.topics
    }

    fn corpus() -> Vec<Vec<String>> {
        let food = [
            "вкусный еда кофе десерт",
            "кофе десерт вкусный",
            "еда вкусный суп кофе",
            "десерт кофе суп",
            "вкусный суп еда",
            "кофе еда десерт суп",
        ];
        let service = [
            "грубый персонал официант ждать",
            "официант ждать долго",
            "персонал грубый долго",
            "ждать официант персонал",
            "долго ждать грубый официант",
            "персонал официант долго",
        ];

        food.iter().chain(service.iter()).map(|document| tokens(document)).collect()
    }

    fn fitted() -> TopicModel {
        let mut model = TopicModel::new(&config());
        model.fit(&corpus()).unwrap();
        model
    }

    fn dominant(distribution: &[TopicWeight]) -> usize {
        distribution.iter().max_by(|a, b| a.weight.total_cmp(&b.weight)).unwrap().topic
    }

    #[test]
    fn separates_disjoint_themes() {
        let model = fitted();

        let food = model.topics_for(&tokens("вкусный кофе десерт")).unwrap();
        let service = model.topics_for(&tokens("грубый официант долго")).unwrap();

        assert_ne!(dominant(&food), dominant(&service));
    }

    #[test]
    fn weights_form_a_sub_distribution() {
        let model = fitted();
        let inputs = ["вкусный кофе", "официант вкусный суп ждать", "салат", "", "еда еда еда"];

        for input in inputs {
            let distribution = model.topics_for(&tokens(input)).unwrap();
            let total: f64 = distribution.iter().map(|topic| topic.weight).sum();

            assert!(total <= 1.0 + 1e-9, "total {} for {:?}", total, input);
            assert!(distribution.iter().all(|topic| topic.weight >= 0.0 && topic.topic < 2));
        }
    }

    #[test]
    fn unknown_or_empty_documents_get_uniform_prior() {
        let model = fitted();

        for input in ["", "салат борщ"] {
            let distribution = model.topics_for(&tokens(input)).unwrap();
            assert_eq!(distribution.len(), 2);
            assert!(distribution.iter().all(|topic| (topic.weight - 0.5).abs() < 1e-12));
        }
    }

    #[test]
    fn negligible_topics_are_omitted() {
        let mut model = TopicModel::new(&toml_config("num_topics = 2\nalpha = 0.001\niterations = 200\nseed = 7\nminimum_probability = 0.2"));
        model.fit(&corpus()).unwrap();

        let distribution = model.topics_for(&tokens("вкусный кофе десерт суп еда")).unwrap();
        assert_eq!(distribution.len(), 1);
    }

    #[test]
    fn fitting_is_reproducible_for_a_seed() {
        let first = fitted();
        let second = fitted();
        let document = tokens("вкусный официант кофе");

        assert_eq!(first.topics_for(&document).unwrap(), second.topics_for(&document).unwrap());
    }

    #[test]
    fn top_terms_are_sorted_by_probability() {
        let model = fitted();
        let terms = model.top_terms(0, 3).unwrap();

        assert_eq!(terms.len(), 3);
        assert!(terms.windows(2).all(|pair| pair[0].1 >= pair[1].1));
        assert!(model.top_terms(2, 3).is_err());
    }

    #[test]
    fn topic_count_must_match_the_topic_term_matrix() {
        let model = fitted();
        assert_eq!(model.validate(), Ok(()));

        let mut value = serde_json::to_value(&model).unwrap();
        value["num_topics"] = serde_json::json!(3);
        let skewed: TopicModel = serde_json::from_value(value).unwrap();

        assert_eq!(skewed.validate(), Err(AnalysisError::DimensionMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn topics_before_fit_is_a_precondition_error() {
        let model = TopicModel::new(&TopicsConfig::default());

        assert_eq!(
            model.topics_for(&tokens("еда")),
            Err(AnalysisError::NotFitted { component: "topic model" }),
        );
        assert!(model.top_terms(0, 1).is_err());
    }

    #[test]
    fn fit_rejects_degenerate_input() {
        let mut model = TopicModel::new(&TopicsConfig::default());
        assert!(matches!(model.fit(&[]), Err(AnalysisError::Training(_))));
        assert!(matches!(model.fit(&[vec![], vec![]]), Err(AnalysisError::Training(_))));

        let mut model = TopicModel::new(&toml_config("num_topics = 0"));
        assert!(matches!(model.fit(&corpus()), Err(AnalysisError::Training(_))));
        assert!(!model.is_fitted());
    }
}
