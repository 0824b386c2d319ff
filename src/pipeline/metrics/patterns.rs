use std::sync::LazyLock;

use regex::Regex;

/// What a capture group in a metric pattern holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRole {
    Value,
    Systolic,
    Diastolic,
    Unit,
}

/// Shape of the numeric part following a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    /// `120` or `6.2`
    Decimal,
    /// `72`
    Integer,
    /// `140/90`
    Ratio,
}

impl ValueShape {
    fn fragment(self) -> &'static str {
        match self {
            Self::Decimal => r"(\d+(?:\.\d+)?)",
            Self::Integer => r"(\d+)",
            Self::Ratio => r"(\d+)\s*/\s*(\d+)",
        }
    }

    fn roles(self) -> &'static [CaptureRole] {
        match self {
            Self::Decimal | Self::Integer => &[CaptureRole::Value, CaptureRole::Unit],
            Self::Ratio => &[CaptureRole::Systolic, CaptureRole::Diastolic, CaptureRole::Unit],
        }
    }
}

/// One entry of the pattern library: a label, a number, an optional unit.
#[derive(Debug)]
pub struct PatternRule {
    pub key: &'static str,
    pub regex: Regex,
    /// Role of capture group `i + 1`.
    pub roles: &'static [CaptureRole],
    /// Accepted units in their display spelling.
    pub units: &'static [&'static str],
    /// Unit reported when the text carries none.
    pub default_unit: Option<&'static str>,
}

impl PatternRule {
    /// Capture group index for a role, if this rule captures it.
    pub fn group(&self, role: CaptureRole) -> Option<usize> {
        self.roles.iter().position(|r| *r == role).map(|i| i + 1)
    }

    /// Map a matched (lower-cased) unit back to its display spelling.
    pub fn canonical_unit(&self, matched: &str) -> Option<&'static str> {
        self.units
            .iter()
            .copied()
            .find(|u| u.to_lowercase() == matched.to_lowercase())
    }
}

fn rule(
    key: &'static str,
    labels: &[&str],
    shape: ValueShape,
    units: &'static [&'static str],
    default_unit: Option<&'static str>,
) -> PatternRule {
    // Longest unit first so `mmol/mol` is not cut short by a shorter prefix.
    let mut sorted: Vec<&str> = units.to_vec();
    sorted.sort_by_key(|u| std::cmp::Reverse(u.len()));
    let unit_alternation = sorted
        .iter()
        .map(|u| regex::escape(u))
        .collect::<Vec<_>>()
        .join("|");

    let expr = format!(
        r"(?i)\b(?:{})\s*[:-]?\s*{}\s*({})?",
        labels.join("|"),
        shape.fragment(),
        unit_alternation,
    );

    PatternRule {
        key,
        regex: Regex::new(&expr).expect("Invalid metric regex pattern"),
        roles: shape.roles(),
        units,
        default_unit,
    }
}

/// The ordered metric pattern library. Extraction output follows this order.
pub static PATTERN_LIBRARY: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    use ValueShape::{Decimal, Integer, Ratio};
    vec![
        rule("glucose", &[r"glucose", r"blood\s+sugar"], Decimal, &["mg/dL", "mmol/L"], None),
        rule(
            "cholesterol",
            &[r"total\s+cholesterol", r"cholesterol"],
            Decimal,
            &["mg/dL", "mmol/L"],
            None,
        ),
        rule(
            "hdl",
            &[r"hdl-c", r"hdl", r"high\s+density\s+lipoprotein"],
            Decimal,
            &["mg/dL", "mmol/L"],
            None,
        ),
        rule(
            "ldl",
            &[r"ldl-c", r"ldl", r"low\s+density\s+lipoprotein"],
            Decimal,
            &["mg/dL", "mmol/L"],
            None,
        ),
        rule("triglycerides", &[r"triglycerides", r"tg"], Decimal, &["mg/dL", "mmol/L"], None),
        rule(
            "a1c",
            &[r"hba1c", r"a1c", r"glycated\s+hemoglobin"],
            Decimal,
            &["%", "mmol/mol"],
            None,
        ),
        rule("blood_pressure", &[r"blood\s+pressure", r"bp"], Ratio, &["mmHg"], Some("mmHg")),
        rule("heart_rate", &[r"heart\s+rate", r"pulse"], Integer, &["bpm"], None),
        rule("creatinine", &[r"creatinine", r"cr"], Decimal, &["mg/dL", "μmol/L"], None),
        rule(
            "egfr",
            &[r"egfr", r"estimated\s+glomerular\s+filtration\s+rate"],
            Decimal,
            &["mL/min/1.73m2"],
            None,
        ),
        rule(
            "tsh",
            &[r"tsh", r"thyroid\s+stimulating\s+hormone"],
            Decimal,
            &["mIU/L", "μIU/mL"],
            None,
        ),
        rule(
            "wbc",
            &[r"wbc", r"white\s+blood\s+cells", r"leukocytes"],
            Decimal,
            &["×10^9/L", "×10^3/μL"],
            None,
        ),
        rule(
            "rbc",
            &[r"rbc", r"red\s+blood\s+cells", r"erythrocytes"],
            Decimal,
            &["×10^12/L", "×10^6/μL"],
            None,
        ),
        rule("hemoglobin", &[r"hemoglobin", r"hgb", r"hb"], Decimal, &["g/dL", "g/L"], None),
        rule(
            "alt",
            &[r"alt", r"alanine\s+aminotransferase", r"sgpt"],
            Decimal,
            &["U/L", "IU/L"],
            None,
        ),
        rule(
            "ast",
            &[r"ast", r"aspartate\s+aminotransferase", r"sgot"],
            Decimal,
            &["U/L", "IU/L"],
            None,
        ),
    ]
});

/// Look up a rule by metric key.
pub fn rule_for(key: &str) -> Option<&'static PatternRule> {
    PATTERN_LIBRARY.iter().find(|r| r.key == key)
}
