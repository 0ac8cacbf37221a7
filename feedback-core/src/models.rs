use {
    std::fmt,
    serde::{Serialize, Deserialize},
};

/// Opaque correlation token of a feedback record. Never interpreted by the pipeline.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum FeedbackId {
    Number(i64),
    Text(String),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Comment {
    pub id: FeedbackId,
    pub text: String,
}

/// One row of the training corpus. `recommend` is the sentiment label, rows
/// without it still take part in vocabulary and topic fitting.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LabeledComment {
    pub id: FeedbackId,
    pub text: String,
    pub recommend: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TopicWeight {
    pub topic: usize,
    pub weight: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub feedback_id: FeedbackId,
    pub clean_text: String,
    pub sentiment_score: f64,
    pub topics: Vec<TopicWeight>,
    pub keywords: Vec<String>,
}

impl From<i32> for FeedbackId {
    fn from(id: i32) -> Self {
        FeedbackId::Number(id as i64)
    }
}

impl From<i64> for FeedbackId {
    fn from(id: i64) -> Self {
        FeedbackId::Number(id)
    }
}

impl From<&str> for FeedbackId {
    fn from(id: &str) -> Self {
        FeedbackId::Text(id.to_owned())
    }
}

impl From<String> for FeedbackId {
    fn from(id: String) -> Self {
        FeedbackId::Text(id)
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackId::Number(id) => write!(f, "{}", id),
            FeedbackId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl Comment {
    pub fn new(id: impl Into<FeedbackId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}
