use serde::{Deserialize, Serialize};

/// A tagged substring returned by an entity recognition backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    /// Tag type without any BIO prefix, e.g. `TEST`.
    pub label: String,
    /// Backend confidence in [0, 1].
    pub score: f32,
    /// Byte offsets into the source text.
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    pub fn new(text: &str, label: &str, score: f32) -> Self {
        Self {
            text: text.to_string(),
            label: label.to_string(),
            score,
            start: 0,
            end: text.len(),
        }
    }

    pub fn at(mut self, start: usize) -> Self {
        self.end = start + self.text.len();
        self.start = start;
        self
    }
}
