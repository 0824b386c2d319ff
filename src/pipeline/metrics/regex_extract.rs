use regex::Captures;

use super::naming::display_name_for_key;
use super::patterns::{CaptureRole, PatternRule, PATTERN_LIBRARY};
use crate::models::{Metric, MetricSource};

pub const SYSTOLIC_NAME: &str = "Blood Pressure (Systolic)";
pub const DIASTOLIC_NAME: &str = "Blood Pressure (Diastolic)";

/// Extract metrics from text using the static pattern library.
///
/// Only the first match of each rule is used. Output follows library order,
/// with systolic before diastolic for blood pressure.
pub fn extract_with_patterns(text: &str) -> Vec<Metric> {
    let lower = text.to_lowercase();
    let mut metrics = Vec::new();

    for rule in PATTERN_LIBRARY.iter() {
        let Some(caps) = rule.regex.captures(&lower) else {
            continue;
        };
        let before = metrics.len();
        metrics.extend(metrics_from_match(rule, &caps));
        tracing::debug!(key = rule.key, emitted = metrics.len() - before, "pattern matched");
    }

    metrics
}

fn metrics_from_match(rule: &PatternRule, caps: &Captures<'_>) -> Vec<Metric> {
    let unit = resolve_unit(rule, caps);

    if rule.group(CaptureRole::Systolic).is_some() {
        let systolic = parse_group(rule, caps, CaptureRole::Systolic);
        let diastolic = parse_group(rule, caps, CaptureRole::Diastolic);
        return match (systolic, diastolic) {
            (Some(s), Some(d)) => [(SYSTOLIC_NAME, s), (DIASTOLIC_NAME, d)]
                .into_iter()
                .filter_map(|(name, value)| {
                    Metric::new(name, value, unit.clone(), MetricSource::Regex)
                })
                .collect(),
            _ => Vec::new(),
        };
    }

    parse_group(rule, caps, CaptureRole::Value)
        .and_then(|value| {
            Metric::new(display_name_for_key(rule.key), value, unit, MetricSource::Regex)
        })
        .into_iter()
        .collect()
}

/// Parse a numeric capture. Unparseable or non-finite values yield `None`.
fn parse_group(rule: &PatternRule, caps: &Captures<'_>, role: CaptureRole) -> Option<f64> {
    let raw = caps.get(rule.group(role)?)?.as_str();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            tracing::debug!(key = rule.key, raw, "dropping unparseable value");
            None
        }
    }
}

fn resolve_unit(rule: &PatternRule, caps: &Captures<'_>) -> String {
    rule.group(CaptureRole::Unit)
        .and_then(|g| caps.get(g))
        .map(|m| m.as_str())
        .filter(|u| !u.is_empty())
        .map(|u| rule.canonical_unit(u).unwrap_or(u).to_string())
        .or_else(|| rule.default_unit.map(str::to_string))
        .unwrap_or_default()
}
