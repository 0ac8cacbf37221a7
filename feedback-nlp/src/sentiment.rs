use {
    ndarray::Array1,
    serde::{Serialize, Deserialize},
    tracing::{debug, info},
    feedback_core::config::ClassifierConfig,
    crate::{
        error::{AnalysisError, Result},
        vectorizer::FeatureVector,
    },
};

/// Binary logistic regression over tf-idf vectors. `score` is the probability of the positive class.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SentimentClassifier {
    c: f64,
    learning_rate: f64,
    max_iterations: usize,
    tolerance: f64,
    weights: Option<ClassifierWeights>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ClassifierWeights {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl SentimentClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            c: config.c,
            learning_rate: config.learning_rate,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            weights: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.weights.as_ref().map(|weights| weights.coefficients.len())
    }

    pub fn fit(&mut self, vectors: &[FeatureVector], labels: &[bool]) -> Result<()> {
        if vectors.is_empty() {
            return Err(AnalysisError::Training("cannot fit classifier without samples".to_owned()));
        }
        if vectors.len() != labels.len() {
            return Err(AnalysisError::Training(format!("{} samples but {} labels", vectors.len(), labels.len())));
        }
        if labels.iter().all(|label| *label) || labels.iter().all(|label| !*label) {
            return Err(AnalysisError::Training("classifier needs samples of both classes".to_owned()));
        }
        if !(self.c > 0.0) || !(self.learning_rate > 0.0) {
            return Err(AnalysisError::Training(format!("invalid c {} or learning rate {}", self.c, self.learning_rate)));
        }

        let dimension = vectors[0].dimension();
        if let Some(vector) = vectors.iter().find(|vector| vector.dimension() != dimension) {
            return Err(AnalysisError::Training(format!(
                "samples have different widths: {} and {}",
                dimension,
                vector.dimension(),
            )));
        }

        let samples = vectors.len() as f64;
        let targets: Vec<f64> = labels.iter().map(|label| if *label { 1.0 } else { 0.0 }).collect();
        let mut coefficients = Array1::<f64>::zeros(dimension);
        let mut intercept = 0.0;
        let mut previous_loss = f64::INFINITY;

        for iteration in 0..self.max_iterations {
            let mut gradient = &coefficients / (self.c * samples);
            let mut intercept_gradient = 0.0;
            let mut loss = coefficients.dot(&coefficients) / (2.0 * self.c * samples);

            for (vector, target) in vectors.iter().zip(targets.iter()) {
                let probability = sigmoid(linear(&coefficients, intercept, vector));
                let error = probability - target;

                for (index, value) in vector.entries() {
                    gradient[*index] += error * value / samples;
                }
                intercept_gradient += error / samples;
                loss += log_loss(*target, probability) / samples;
            }

            coefficients.scaled_add(-self.learning_rate, &gradient);
            intercept -= self.learning_rate * intercept_gradient;

            if (previous_loss - loss).abs() < self.tolerance {
                debug!("classifier converged after {} iterations, loss {:.6}", iteration + 1, loss);
                break;
            }
            previous_loss = loss;
        }

        info!("fitted sentiment classifier on {} samples, {} features", vectors.len(), dimension);
        self.weights = Some(ClassifierWeights { coefficients, intercept });

        Ok(())
    }

    pub fn score(&self, vector: &FeatureVector) -> Result<f64> {
        let weights = self.weights.as_ref().ok_or(AnalysisError::NotFitted { component: "sentiment classifier" })?;

        if vector.dimension() != weights.coefficients.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: weights.coefficients.len(),
                got: vector.dimension(),
            });
        }

        Ok(sigmoid(linear(&weights.coefficients, weights.intercept, vector)))
    }
}

fn linear(coefficients: &Array1<f64>, intercept: f64, vector: &FeatureVector) -> f64 {
    intercept + vector.entries().iter().map(|(index, value)| coefficients[*index] * value).sum::<f64>()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

fn log_loss(target: f64, probability: f64) -> f64 {
    let p = probability.clamp(1e-15, 1.0 - 1e-15);
    -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(index: usize) -> FeatureVector {
        FeatureVector::new(3, vec![(index, 1.0)]).unwrap()
    }

    fn fitted() -> SentimentClassifier {
        let mut classifier = SentimentClassifier::new(&ClassifierConfig::default());
        classifier.fit(
            &[sample(0), sample(0), sample(1), sample(1), sample(2)],
            &[true, true, false, false, true],
        ).unwrap();
        classifier
    }

    #[test]
    fn separates_the_classes() {
        let classifier = fitted();

        assert!(classifier.score(&sample(0)).unwrap() > 0.5);
        assert!(classifier.score(&sample(1)).unwrap() < 0.5);
        assert_eq!(classifier.dimension(), Some(3));
    }

    #[test]
    fn score_stays_within_unit_interval() {
        let classifier = fitted();
        let vectors = [
            FeatureVector::new(3, vec![]).unwrap(),
            FeatureVector::new(3, vec![(0, 1e6)]).unwrap(),
            FeatureVector::new(3, vec![(1, 1e6)]).unwrap(),
            FeatureVector::new(3, vec![(0, -3.5), (1, 0.25), (2, 7.0)]).unwrap(),
        ];

        for vector in vectors.iter() {
            let score = classifier.score(vector).unwrap();
            assert!((0.0..=1.0).contains(&score), "score {} out of bounds", score);
        }
    }

    #[test]
    fn zero_vector_scores_the_intercept() {
        let classifier = fitted();
        let score = classifier.score(&FeatureVector::new(3, vec![]).unwrap()).unwrap();

        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let classifier = fitted();

        assert_eq!(
            classifier.score(&FeatureVector::new(4, vec![(3, 1.0)]).unwrap()),
            Err(AnalysisError::DimensionMismatch { expected: 3, got: 4 }),
        );
    }

    #[test]
    fn score_before_fit_is_a_precondition_error() {
        let classifier = SentimentClassifier::new(&ClassifierConfig::default());

        assert_eq!(
            classifier.score(&sample(0)),
            Err(AnalysisError::NotFitted { component: "sentiment classifier" }),
        );
    }

    #[test]
    fn fit_rejects_degenerate_input() {
        let mut classifier = SentimentClassifier::new(&ClassifierConfig::default());

        assert!(matches!(classifier.fit(&[], &[]), Err(AnalysisError::Training(_))));
        assert!(matches!(classifier.fit(&[sample(0), sample(1)], &[true, true]), Err(AnalysisError::Training(_))));
        assert!(matches!(classifier.fit(&[sample(0)], &[true, false]), Err(AnalysisError::Training(_))));
        assert!(matches!(
            classifier.fit(&[sample(0), FeatureVector::new(5, vec![]).unwrap()], &[true, false]),
            Err(AnalysisError::Training(_)),
        ));
        assert!(!classifier.is_fitted());
    }
}
