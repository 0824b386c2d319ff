pub mod entity;
pub mod enums;
pub mod metric;

pub use entity::EntitySpan;
pub use enums::{InvalidEnum, MetricSource, MetricStatus, ReportCategory};
pub use metric::{Metric, ReportAnalysis};
