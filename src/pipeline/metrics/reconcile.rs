//! Merge entity-derived metrics into the pattern-derived list.
//!
//! Pattern metrics go in first. Each entity candidate is then checked only
//! against the list as it stands at that moment, so two entity metrics in
//! one pass are never compared with later ones.

use super::naming::format_name;
use super::proximity::find_value_near_within;
use crate::config::EngineConfig;
use crate::models::{EntitySpan, Metric, MetricSource};

/// Tag types that name a measurable clinical concept.
const MEDICAL_ENTITY_TYPES: &[&str] = &["TEST", "PROBLEM", "TREATMENT"];

/// Words in entity text that suggest a measurement.
const MEDICAL_TEST_KEYWORDS: &[&str] = &["level", "count", "test", "rate", "index", "ratio"];

/// Whether a tagged span looks like a medical test worth a value lookup.
pub fn is_medical_test_entity(entity_type: &str, entity_text: &str) -> bool {
    if MEDICAL_ENTITY_TYPES.contains(&entity_type) {
        return true;
    }
    let lower = entity_text.to_lowercase();
    MEDICAL_TEST_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Relative difference `|a - b| / max(a, b)`; equal values (including two
/// zeros) are 0.
fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        return 0.0;
    }
    (a - b).abs() / scale
}

/// Whether `candidate_name`/`candidate_value` repeats a metric already in
/// `existing`: names overlap as case-insensitive substrings (either way) and
/// values differ by less than `tolerance`.
pub fn is_duplicate(
    existing: &[Metric],
    candidate_name: &str,
    candidate_value: f64,
    tolerance: f64,
) -> bool {
    let candidate = candidate_name.to_lowercase();

    existing.iter().any(|metric| {
        let name = metric.name.to_lowercase();
        let names_overlap = name.contains(&candidate) || candidate.contains(&name);
        names_overlap && relative_difference(metric.value, candidate_value) < tolerance
    })
}

/// Append metrics found next to qualifying entities to `metrics`.
pub fn merge_entity_metrics(
    text: &str,
    mut metrics: Vec<Metric>,
    entities: &[EntitySpan],
    config: &EngineConfig,
) -> Vec<Metric> {
    for entity in entities {
        if entity.score < config.min_entity_confidence {
            continue;
        }
        if !is_medical_test_entity(&entity.label, &entity.text) {
            continue;
        }

        let Some((value, unit)) = find_value_near_within(text, &entity.text, config.context_window)
        else {
            tracing::debug!(entity = %entity.text, "no value near entity");
            continue;
        };

        if is_duplicate(&metrics, &entity.text, value, config.duplicate_tolerance) {
            tracing::debug!(entity = %entity.text, value, "entity metric duplicates an existing one");
            continue;
        }

        match Metric::new(format_name(&entity.text), value, unit, MetricSource::Entity) {
            Some(metric) => {
                tracing::debug!(name = %metric.name, value, "entity metric added");
                metrics.push(metric);
            }
            None => tracing::debug!(entity = %entity.text, "entity name formats to nothing"),
        }
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str, value: f64) -> Metric {
        Metric::new(name, value, "", MetricSource::Regex).unwrap()
    }

    #[test]
    fn close_value_with_overlapping_name_is_duplicate() {
        let existing = vec![metric("Glucose", 120.0)];
        assert!(is_duplicate(&existing, "glucose level", 121.0, 0.05));
    }

    #[test]
    fn distant_value_is_not_duplicate() {
        let existing = vec![metric("Glucose", 120.0)];
        assert!(!is_duplicate(&existing, "glucose", 140.0, 0.05));
    }

    #[test]
    fn unrelated_name_is_not_duplicate() {
        let existing = vec![metric("Glucose", 120.0)];
        assert!(!is_duplicate(&existing, "ferritin", 120.0, 0.05));
    }

    #[test]
    fn containment_works_in_both_directions() {
        let existing = vec![metric("Platelet Count", 250.0)];
        assert!(is_duplicate(&existing, "platelet", 251.0, 0.05));
    }

    #[test]
    fn zero_values_do_not_divide_by_zero() {
        let existing = vec![metric("Ketones", 0.0)];
        assert!(is_duplicate(&existing, "ketones", 0.0, 0.05));
        assert!(!is_duplicate(&existing, "ketones", 1.0, 0.05));
    }

    #[test]
    fn entity_type_or_keyword_qualifies() {
        assert!(is_medical_test_entity("TEST", "ferritin"));
        assert!(is_medical_test_entity("PROBLEM", "anemia"));
        assert!(is_medical_test_entity("TREATMENT", "metformin"));
        assert!(is_medical_test_entity("O", "Platelet Count"));
        assert!(is_medical_test_entity("MISC", "albumin/creatinine ratio"));
        assert!(!is_medical_test_entity("PERSON", "Dr. Chen"));
    }

    #[test]
    fn low_confidence_entities_are_skipped() {
        let text = "ferritin 85 ng/mL";
        let entities = vec![EntitySpan::new("ferritin", "TEST", 0.69)];
        let merged = merge_entity_metrics(text, Vec::new(), &entities, &EngineConfig::default());
        assert!(merged.is_empty());
    }

    #[test]
    fn confidence_threshold_is_inclusive() {
        let text = "ferritin 85 ng/mL";
        let entities = vec![EntitySpan::new("ferritin", "TEST", 0.70)];
        let merged = merge_entity_metrics(text, Vec::new(), &entities, &EngineConfig::default());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn entity_metric_appended_after_pattern_metrics() {
        let text = "Ferritin level 85 ng/mL. glucose: 120 mg/dL.";
        let seed = vec![metric("Glucose", 120.0)];
        let entities = vec![EntitySpan::new("Ferritin level", "TEST", 0.9)];

        let merged = merge_entity_metrics(text, seed, &entities, &EngineConfig::default());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Glucose");
        assert_eq!(merged[1].name, "Ferritin");
        assert_eq!(merged[1].value, 85.0);
        assert_eq!(merged[1].unit, "ng/mL");
        assert_eq!(merged[1].source, MetricSource::Entity);
    }

    #[test]
    fn window_can_borrow_a_neighbouring_value() {
        let text = "glucose: 120 mg/dL. Ferritin level 85 ng/mL.";
        let entities = vec![EntitySpan::new("Ferritin level", "TEST", 0.9).at(20)];
        let merged = merge_entity_metrics(text, Vec::new(), &entities, &EngineConfig::default());
        assert_eq!(merged[0].name, "Ferritin");
        assert_eq!(merged[0].value, 120.0);
        assert_eq!(merged[0].unit, "mg/dL");
    }

    #[test]
    fn entity_repeating_a_pattern_metric_is_suppressed() {
        let text = "glucose level 120 mg/dL";
        let seed = vec![metric("Glucose", 120.0)];
        let entities = vec![EntitySpan::new("glucose level", "TEST", 0.95)];

        let merged = merge_entity_metrics(text, seed.clone(), &entities, &EngineConfig::default());
        assert_eq!(merged, seed);
    }

    #[test]
    fn entity_duplicates_checked_only_against_earlier_entries() {
        let text = "sodium 140 mmol/L";
        let entities = vec![
            EntitySpan::new("sodium", "TEST", 0.9),
            EntitySpan::new("Sodium", "TEST", 0.9),
        ];
        let merged = merge_entity_metrics(text, Vec::new(), &entities, &EngineConfig::default());
        // The second span sees the first one and is suppressed.
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Sodium");
    }

    #[test]
    fn entity_without_nearby_value_is_skipped() {
        let text = "ferritin pending";
        let entities = vec![EntitySpan::new("ferritin", "TEST", 0.9)];
        let merged = merge_entity_metrics(text, Vec::new(), &entities, &EngineConfig::default());
        assert!(merged.is_empty());
    }

    #[test]
    fn non_medical_entities_are_ignored() {
        let text = "seen by Dr. Chen on 12 March";
        let entities = vec![EntitySpan::new("Dr. Chen", "PERSON", 0.99)];
        let merged = merge_entity_metrics(text, Vec::new(), &entities, &EngineConfig::default());
        assert!(merged.is_empty());
    }
}
