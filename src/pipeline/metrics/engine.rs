//! Extraction engine: pattern metrics, entity metrics, and report category.
//!
//! The engine holds only read-only state (its config and a shared backend
//! handle), so one instance can serve concurrent callers.

use std::sync::Arc;
use std::time::Duration;

use super::classify::classify_report;
use super::error::ExtractionError;
use super::reconcile::merge_entity_metrics;
use super::recognizer::{tag_entities, EntityRecognizer, HttpEntityRecognizer, NoopRecognizer};
use super::regex_extract::extract_with_patterns;
use crate::config::EngineConfig;
use crate::models::{EntitySpan, Metric, ReportAnalysis, ReportCategory};

pub struct MetricExtractor {
    config: EngineConfig,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl MetricExtractor {
    pub fn new(config: EngineConfig, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { config, recognizer }
    }

    /// Pattern-only engine with no entity backend.
    pub fn offline(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(NoopRecognizer))
    }

    /// Build an engine from config, using the HTTP backend when a URL is set.
    pub fn from_config(config: EngineConfig) -> Result<Self, ExtractionError> {
        config.validate()?;
        let recognizer: Arc<dyn EntityRecognizer> = match &config.backend_url {
            Some(url) => Arc::new(HttpEntityRecognizer::new(url, config.backend_timeout_secs)?),
            None => Arc::new(NoopRecognizer),
        };
        Ok(Self::new(config, recognizer))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pattern metrics followed by non-duplicate entity metrics.
    pub fn extract_metrics(&self, text: &str) -> Vec<Metric> {
        let _span = tracing::info_span!(
            "extract_metrics",
            backend = self.recognizer.name(),
            chars = text.len()
        )
        .entered();

        let metrics = extract_with_patterns(text);
        if text.trim().is_empty() {
            return metrics;
        }

        let entities = tag_entities(self.recognizer.as_ref(), text);
        self.finish(text, metrics, &entities)
    }

    /// Pattern metrics only; never touches the backend.
    pub fn extract_with_patterns_only(&self, text: &str) -> Vec<Metric> {
        extract_with_patterns(text)
    }

    pub fn classify_report(&self, text: &str, metrics: &[Metric]) -> ReportCategory {
        classify_report(text, metrics)
    }

    /// Extract metrics and classify the report in one call.
    pub fn analyze_report(&self, text: &str) -> ReportAnalysis {
        let metrics = self.extract_metrics(text);
        let category = classify_report(text, &metrics);
        ReportAnalysis { metrics, category }
    }

    /// Like [`MetricExtractor::extract_metrics`] for raw bytes. Non-UTF-8
    /// input is rejected before any matching.
    pub fn extract_metrics_from_bytes(&self, bytes: &[u8]) -> Result<Vec<Metric>, ExtractionError> {
        Ok(self.extract_metrics(decode_report(bytes)?))
    }

    pub fn analyze_report_bytes(&self, bytes: &[u8]) -> Result<ReportAnalysis, ExtractionError> {
        Ok(self.analyze_report(decode_report(bytes)?))
    }

    /// Async extraction that waits at most `timeout` for the backend.
    ///
    /// The backend call runs on the blocking pool. A timeout, a backend error,
    /// or a panicked task all fall back to pattern metrics. With the HTTP
    /// backend, create and drop the engine outside the runtime: the blocking
    /// reqwest client owns its own runtime.
    pub async fn extract_metrics_with_timeout(&self, text: &str, timeout: Duration) -> Vec<Metric> {
        let metrics = extract_with_patterns(text);
        if text.trim().is_empty() {
            return metrics;
        }

        let recognizer = Arc::clone(&self.recognizer);
        let owned = text.to_string();
        let task = tokio::task::spawn_blocking(move || tag_entities(recognizer.as_ref(), &owned));

        let entities = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(entities)) => entities,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "entity task failed, continuing with pattern metrics only");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "entity backend timed out, continuing with pattern metrics only"
                );
                Vec::new()
            }
        };

        self.finish(text, metrics, &entities)
    }

    fn finish(&self, text: &str, metrics: Vec<Metric>, entities: &[EntitySpan]) -> Vec<Metric> {
        let pattern_count = metrics.len();
        let merged = merge_entity_metrics(text, metrics, entities, &self.config);
        tracing::info!(
            pattern_metrics = pattern_count,
            entity_metrics = merged.len() - pattern_count,
            entities = entities.len(),
            "extraction complete"
        );
        merged
    }
}

fn decode_report(bytes: &[u8]) -> Result<&str, ExtractionError> {
    std::str::from_utf8(bytes)
        .map_err(|e| ExtractionError::InvalidInput(format!("report is not valid UTF-8: {e}")))
}

impl std::fmt::Debug for MetricExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricExtractor")
            .field("config", &self.config)
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
