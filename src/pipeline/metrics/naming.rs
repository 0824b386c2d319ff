use std::sync::LazyLock;

use regex::Regex;

/// Descriptor word at the end of an entity name ("Glucose Level").
static TRAILING_DESCRIPTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:level|count|test|rate)$").unwrap());

static WORD_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Uppercase the first character, lowercase the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Display name for a raw metric or entity name.
///
/// Drops one trailing `level`/`count`/`test`/`rate` word, splits on
/// whitespace, `_` and `-`, and title-cases what is left.
pub fn format_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = TRAILING_DESCRIPTOR.replace(trimmed, "");

    WORD_SEPARATORS
        .split(&stripped)
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name for a pattern library key (`heart_rate` → `Heart Rate`).
pub fn display_name_for_key(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_level() {
        assert_eq!(format_name("Glucose Level"), "Glucose");
        assert_eq!(format_name("platelet count"), "Platelet");
    }

    #[test]
    fn underscore_name_is_title_cased() {
        assert_eq!(format_name("heart_rate"), "Heart Rate");
    }

    #[test]
    fn descriptor_stripped_case_insensitively() {
        assert_eq!(format_name("CHOLESTEROL TEST"), "Cholesterol");
    }

    #[test]
    fn only_one_descriptor_stripped() {
        assert_eq!(format_name("blood test level"), "Blood Test");
    }

    #[test]
    fn descriptor_inside_name_is_kept() {
        assert_eq!(format_name("rate of filtration"), "Rate Of Filtration");
    }

    #[test]
    fn lone_descriptor_is_not_erased() {
        assert_eq!(format_name("level"), "Level");
    }

    #[test]
    fn hyphens_and_runs_of_whitespace_collapse() {
        assert_eq!(format_name("  ldl-c   cholesterol "), "Ldl C Cholesterol");
    }

    #[test]
    fn empty_input_formats_to_empty() {
        assert_eq!(format_name("   "), "");
    }

    #[test]
    fn key_display_names() {
        assert_eq!(display_name_for_key("a1c"), "A1c");
        assert_eq!(display_name_for_key("heart_rate"), "Heart Rate");
        assert_eq!(display_name_for_key("egfr"), "Egfr");
    }
}
