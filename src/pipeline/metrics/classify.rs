use crate::models::{Metric, ReportCategory};

/// Category keyword table. Array order is also the tie-break priority.
pub const CATEGORY_KEYWORDS: [(ReportCategory, &[&str]); 5] = [
    (
        ReportCategory::Diabetes,
        &["glucose", "a1c", "insulin", "diabetes", "glycemic"],
    ),
    (
        ReportCategory::Lipid,
        &["cholesterol", "hdl", "ldl", "triglycerides", "lipid"],
    ),
    (
        ReportCategory::Cbc,
        &["hemoglobin", "hematocrit", "wbc", "rbc", "platelets", "blood count"],
    ),
    (
        ReportCategory::Liver,
        &["alt", "ast", "alp", "bilirubin", "liver", "hepatic"],
    ),
    (
        ReportCategory::Kidney,
        &["creatinine", "egfr", "bun", "kidney", "renal"],
    ),
];

/// Weight of one extracted metric relative to one keyword mention.
const METRIC_WEIGHT: u32 = 2;

/// Per-category scores, in table order.
///
/// A category scores one point per keyword occurrence in the lower-cased
/// text plus two per metric whose name contains any of its keywords.
pub fn category_scores(text: &str, metrics: &[Metric]) -> Vec<(ReportCategory, u32)> {
    let lower = text.to_lowercase();
    let metric_names: Vec<String> = metrics.iter().map(|m| m.name.to_lowercase()).collect();

    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let text_hits: usize = keywords.iter().map(|k| lower.matches(k).count()).sum();
            let metric_hits = metric_names
                .iter()
                .filter(|name| keywords.iter().any(|k| name.contains(k)))
                .count();
            let score = u32::try_from(text_hits).unwrap_or(u32::MAX).saturating_add(
                u32::try_from(metric_hits)
                    .unwrap_or(u32::MAX)
                    .saturating_mul(METRIC_WEIGHT),
            );
            (*category, score)
        })
        .collect()
}

/// Classify a report. The strictly highest score wins, earlier categories win
/// ties, and all-zero scores give `General`.
pub fn classify_report(text: &str, metrics: &[Metric]) -> ReportCategory {
    let mut best = ReportCategory::General;
    let mut best_score = 0;

    for (category, score) in category_scores(text, metrics) {
        if score > best_score {
            best = category;
            best_score = score;
        }
    }

    tracing::debug!(category = %best, score = best_score, "report classified");
    best
}
