//! Proximity search for an entity's value.
//!
//! Looks at a fixed character window around the first mention of the entity
//! and takes the first number found there. No parsing of sentence structure:
//! a value from unrelated nearby text can be picked up.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::config::DEFAULT_CONTEXT_WINDOW;

/// A number with an optional unit-like suffix (`126 mg/dL`, `6.2%`).
static VALUE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([a-zA-Z/%]+)?").unwrap());

/// Find a value near `entity_text` using the default window.
pub fn find_value_near(text: &str, entity_text: &str) -> Option<(f64, String)> {
    find_value_near_within(text, entity_text, DEFAULT_CONTEXT_WINDOW)
}

/// Find the first parseable `(value, unit)` within `window` characters of the
/// first case-insensitive occurrence of `entity_text`.
pub fn find_value_near_within(
    text: &str,
    entity_text: &str,
    window: usize,
) -> Option<(f64, String)> {
    if entity_text.trim().is_empty() {
        return None;
    }

    let needle = RegexBuilder::new(&regex::escape(entity_text))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = needle.find(text)?;

    let start = step_back_chars(text, found.start(), window);
    let end = step_forward_chars(text, found.end(), window);
    let context = &text[start..end];

    VALUE_TOKEN.captures_iter(context).find_map(|caps| {
        let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        let unit = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        Some((value, unit.to_string()))
    })
}

/// Byte offset `n` characters before `from`, clipped to the start of `text`.
fn step_back_chars(text: &str, from: usize, n: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(from, |(i, _)| i)
}

/// Byte offset `n` characters after `from`, clipped to the end of `text`.
fn step_forward_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_value_after_entity() {
        let found = find_value_near("Fasting glucose level of 126 mg/dL noted", "glucose level");
        assert_eq!(found, Some((126.0, "mg/dL".to_string())));
    }

    #[test]
    fn entity_lookup_is_case_insensitive() {
        let found = find_value_near("PLATELET COUNT 250 k/uL", "platelet count");
        assert_eq!(found, Some((250.0, "k/uL".to_string())));
    }

    #[test]
    fn missing_entity_yields_none() {
        assert_eq!(find_value_near("glucose 120", "ferritin"), None);
    }

    #[test]
    fn no_number_in_window_yields_none() {
        assert_eq!(find_value_near("ferritin was not measured", "ferritin"), None);
    }

    #[test]
    fn value_without_unit_has_empty_unit() {
        assert_eq!(
            find_value_near("ferritin 85, within range", "ferritin"),
            Some((85.0, String::new()))
        );
    }

    #[test]
    fn percent_unit_captured() {
        assert_eq!(
            find_value_near("glycated hemoglobin 6.4% today", "glycated hemoglobin"),
            Some((6.4, "%".to_string()))
        );
    }

    #[test]
    fn preceding_number_inside_window_wins() {
        // The window starts before the entity, so an earlier number is taken first.
        let found = find_value_near("Result 98 for ferritin 85", "ferritin");
        assert_eq!(found.map(|(v, _)| v), Some(98.0));
    }

    #[test]
    fn value_outside_window_is_ignored() {
        let text = format!("ferritin{} 85", " ".repeat(60));
        assert_eq!(find_value_near(&text, "ferritin"), None);
        assert_eq!(find_value_near_within(&text, "ferritin", 70).map(|(v, _)| v), Some(85.0));
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        // 50 characters but 98 bytes before the entity.
        let text = format!("7 {}ferritin", "é".repeat(48));
        assert_eq!(find_value_near(&text, "ferritin").map(|(v, _)| v), Some(7.0));
    }

    #[test]
    fn blank_entity_yields_none() {
        assert_eq!(find_value_near("glucose 120", "  "), None);
    }

    #[test]
    fn regex_metacharacters_in_entity_are_literal() {
        assert_eq!(
            find_value_near("ferritin (serum) 48 ng/mL", "ferritin (serum)"),
            Some((48.0, "ng/mL".to_string()))
        );
    }
}
