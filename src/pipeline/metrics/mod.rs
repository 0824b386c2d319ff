//! Clinical metric extraction from free-text reports.
//!
//! ```text
//! text ─▶ patterns ──────────────────────────┐
//!   └──▶ recognizer ─▶ proximity ─▶ reconcile ─▶ metrics ─▶ classify
//! ```
//!
//! Pattern matching is deterministic. The entity backend only adds metrics
//! and can fail or time out without affecting the pattern results.

pub mod error;
pub mod patterns;
pub mod naming;
pub mod regex_extract;
pub mod recognizer;
pub mod proximity;
pub mod reconcile;
pub mod classify;
pub mod engine;

pub use error::{ExtractionError, RecognizerError};
pub use patterns::{rule_for, CaptureRole, PatternRule, PATTERN_LIBRARY};
pub use naming::{display_name_for_key, format_name};
pub use regex_extract::extract_with_patterns;
pub use recognizer::{tag_entities, EntityRecognizer, HttpEntityRecognizer, MockRecognizer, NoopRecognizer};
pub use proximity::{find_value_near, find_value_near_within};
pub use reconcile::{is_duplicate, is_medical_test_entity, merge_entity_metrics};
pub use classify::{category_scores, classify_report, CATEGORY_KEYWORDS};
pub use engine::MetricExtractor;
