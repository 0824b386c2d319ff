use serde::{Deserialize, Serialize};

use super::enums::{MetricSource, MetricStatus, ReportCategory};

/// One structured clinical measurement pulled out of report text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub status: MetricStatus,
    pub source: MetricSource,
}

impl Metric {
    /// Build a metric with the default `normal` status.
    ///
    /// Returns `None` for an empty name or a non-finite value so neither can
    /// leak into a result list.
    pub fn new(
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        source: MetricSource,
    ) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() || !value.is_finite() {
            return None;
        }
        Some(Self {
            name,
            value,
            unit: unit.into(),
            status: MetricStatus::Normal,
            source,
        })
    }
}

/// Metrics plus the report category derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub metrics: Vec<Metric>,
    pub category: ReportCategory,
}
