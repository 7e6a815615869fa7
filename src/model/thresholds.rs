use crate::model::record::StudyRecord;

/// Approval below this percentage flags a study for attention.
pub const CRITICAL_APPROVAL_PCT: f64 = 70.0;
/// Completeness below this percentage flags a study for attention.
pub const CRITICAL_COMPLETENESS_PCT: f64 = 80.0;

/// Rows shown on the critical sheet/table.
pub const CRITICAL_VIEW_LIMIT: usize = 20;
/// Companies shown in the completeness ranking.
pub const COMPLETENESS_RANKING_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandThresholds {
    pub lower: f64,
    pub upper: f64,
}

impl BandThresholds {
    /// Approval-rate charts.
    pub const APPROVAL: Self = Self::new(70.0, 90.0);
    /// Completeness-by-company chart.
    pub const COMPLETENESS: Self = Self::new(60.0, 80.0);
    /// Fixed export cell coloring, independent of the metric.
    pub const EXPORT: Self = Self::new(70.0, 90.0);

    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
}

pub fn is_critical(record: &StudyRecord) -> bool {
    record.raw.approved_pct < CRITICAL_APPROVAL_PCT
        || record.raw.completeness_pct < CRITICAL_COMPLETENESS_PCT
}
