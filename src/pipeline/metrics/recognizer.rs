use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::RecognizerError;
use crate::models::EntitySpan;

/// Entity recognition backend abstraction (allows mocking).
///
/// Implementations may block; the engine decides how long to wait.
pub trait EntityRecognizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError>;
}

/// Run the backend, absorbing any failure into an empty span list.
pub fn tag_entities(recognizer: &dyn EntityRecognizer, text: &str) -> Vec<EntitySpan> {
    match recognizer.recognize(text) {
        Ok(spans) => {
            tracing::debug!(backend = recognizer.name(), spans = spans.len(), "entities tagged");
            spans
        }
        Err(e) => {
            tracing::warn!(
                backend = recognizer.name(),
                error = %e,
                "entity backend unavailable, continuing with pattern metrics only"
            );
            Vec::new()
        }
    }
}

/// Drop a `B-`/`I-` token-classification prefix from a tag.
fn strip_bio_prefix(label: &str) -> &str {
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// HTTP client for a remote token-classification service.
///
/// Posts `{"text": ...}` to `{base_url}/ner` and expects the span list a
/// token-classification pipeline with simple aggregation returns.
pub struct HttpEntityRecognizer {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpEntityRecognizer {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RecognizerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RecognizerError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for `/ner`
#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

/// One span in the `/ner` response.
#[derive(Deserialize)]
struct NerSpan {
    #[serde(alias = "text")]
    word: String,
    #[serde(alias = "entity", alias = "type")]
    entity_group: String,
    score: f32,
    #[serde(default)]
    start: usize,
    #[serde(default)]
    end: usize,
}

impl From<NerSpan> for EntitySpan {
    fn from(span: NerSpan) -> Self {
        Self {
            label: strip_bio_prefix(&span.entity_group).to_string(),
            text: span.word,
            score: span.score,
            start: span.start,
            end: span.end,
        }
    }
}

fn parse_ner_response(body: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
    let spans: Vec<NerSpan> = serde_json::from_str(body)
        .map_err(|e| RecognizerError::MalformedResponse(e.to_string()))?;
    Ok(spans.into_iter().map(EntitySpan::from).collect())
}

impl EntityRecognizer for HttpEntityRecognizer {
    fn name(&self) -> &str {
        "http"
    }

    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        let url = format!("{}/ner", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&NerRequest { text })
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RecognizerError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RecognizerError::Timeout(self.timeout_secs)
                } else {
                    RecognizerError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RecognizerError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| RecognizerError::MalformedResponse(e.to_string()))?;
        parse_ner_response(&body)
    }
}

/// Backend that never finds anything. Used for pattern-only runs.
#[derive(Debug, Default)]
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn name(&self) -> &str {
        "noop"
    }

    fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        Ok(Vec::new())
    }
}

/// Mock backend for tests. Returns fixed spans or a fixed failure.
pub struct MockRecognizer {
    spans: Vec<EntitySpan>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockRecognizer {
    pub fn new(spans: Vec<EntitySpan>) -> Self {
        Self {
            spans,
            failure: None,
            delay: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            spans: Vec::new(),
            failure: Some(message.to_string()),
            delay: None,
        }
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl EntityRecognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>, RecognizerError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match &self.failure {
            Some(message) => Err(RecognizerError::HttpClient(message.clone())),
            None => Ok(self.spans.clone()),
        }
    }
}
