use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::band::{StatusBand, band};
use crate::model::record::{STAGE_NAMES, StudyRecord};
use crate::model::thresholds::{BandThresholds, COMPLETENESS_RANKING_LIMIT};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyAggregate {
    pub company: String,
    pub studies: usize,
    pub total_batches: u64,
    pub approved: u64,
    pub rejected: u64,
    pub approval_rate: f64,
    pub band: StatusBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyCompleteness {
    pub company: String,
    pub total_batches: u64,
    pub mean_completeness: f64,
    pub band: StatusBand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    pub rows: usize,
    pub total_batches: u64,
    pub approved: u64,
    pub rejected: u64,
    pub approval_rate: f64,
    pub rejection_rate: f64,
    pub mean_completeness: f64,
    pub unique_studies: usize,
    pub unique_companies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMean {
    pub stage: &'static str,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Approved,
    Rejected,
    Rework,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSlice {
    pub status: BatchStatus,
    pub count: u64,
    pub share: f64,
}

/// `part / whole * 100`, or 0 when there is nothing to divide by.
pub fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Counts come straight from the source file; sums clamp instead of wrapping.
fn total(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Per-company rollup, lowest approval first. Companies with no batches
/// are dropped; rows without a company name are ignored.
pub fn aggregate_by_company(rows: &[StudyRecord]) -> Vec<CompanyAggregate> {
    aggregate_by_company_with(rows, BandThresholds::APPROVAL)
}

pub fn aggregate_by_company_with(
    rows: &[StudyRecord],
    thresholds: BandThresholds,
) -> Vec<CompanyAggregate> {
    #[derive(Default)]
    struct Acc {
        studies: usize,
        total: u64,
        approved: u64,
        rejected: u64,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for row in rows {
        let Some(company) = row.company() else {
            continue;
        };
        let acc = groups.entry(company).or_default();
        acc.studies += 1;
        acc.total = acc.total.saturating_add(row.raw.total_batches);
        acc.approved = acc.approved.saturating_add(row.raw.approved);
        acc.rejected = acc.rejected.saturating_add(row.raw.rejected);
    }

    let mut out: Vec<CompanyAggregate> = groups
        .into_iter()
        .map(|(company, acc)| {
            let approval_rate = rate(acc.approved, acc.total);
            CompanyAggregate {
                company: company.to_string(),
                studies: acc.studies,
                total_batches: acc.total,
                approved: acc.approved,
                rejected: acc.rejected,
                approval_rate,
                band: band(approval_rate, thresholds),
            }
        })
        .filter(|agg| agg.total_batches > 0)
        .collect();
    out.sort_by(|a, b| {
        a.approval_rate
            .partial_cmp(&b.approval_rate)
            .unwrap_or(Ordering::Equal)
    });
    out
}

pub fn completeness_by_company(rows: &[StudyRecord]) -> Vec<CompanyCompleteness> {
    let mut groups: BTreeMap<&str, (u64, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        let Some(company) = row.company() else {
            continue;
        };
        let entry = groups.entry(company).or_default();
        entry.0 = entry.0.saturating_add(row.raw.total_batches);
        entry.1.push(row.raw.completeness_pct);
    }

    let mut out: Vec<CompanyCompleteness> = groups
        .into_iter()
        .filter(|(_, (total, _))| *total > 0)
        .map(|(company, (total, values))| {
            let mean_completeness = mean(values);
            CompanyCompleteness {
                company: company.to_string(),
                total_batches: total,
                mean_completeness,
                band: band(mean_completeness, BandThresholds::COMPLETENESS),
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.mean_completeness
            .partial_cmp(&a.mean_completeness)
            .unwrap_or(Ordering::Equal)
    });
    out.truncate(COMPLETENESS_RANKING_LIMIT);
    out
}

pub fn summarize(rows: &[StudyRecord]) -> KpiSummary {
    let total_batches = total(rows.iter().map(|r| r.raw.total_batches));
    let approved = total(rows.iter().map(|r| r.raw.approved));
    let rejected = total(rows.iter().map(|r| r.raw.rejected));
    let unique_studies: BTreeSet<&str> = rows.iter().filter_map(StudyRecord::study).collect();
    let unique_companies: BTreeSet<&str> = rows.iter().filter_map(StudyRecord::company).collect();

    KpiSummary {
        rows: rows.len(),
        total_batches,
        approved,
        rejected,
        approval_rate: rate(approved, total_batches),
        rejection_rate: rate(rejected, total_batches),
        mean_completeness: mean(rows.iter().map(|r| r.raw.completeness_pct)),
        unique_studies: unique_studies.len(),
        unique_companies: unique_companies.len(),
    }
}

pub fn stage_means(rows: &[StudyRecord]) -> Vec<StageMean> {
    STAGE_NAMES
        .into_iter()
        .enumerate()
        .map(|(idx, stage)| StageMean {
            stage,
            mean: mean(rows.iter().map(|r| r.raw.stages.as_array()[idx])),
        })
        .collect()
}

/// Approved / rejected / rework (re-analysis plus re-test), empty buckets
/// omitted. Shares are relative to the sum of the buckets shown.
pub fn status_distribution(rows: &[StudyRecord]) -> Vec<StatusSlice> {
    let approved = total(rows.iter().map(|r| r.raw.approved));
    let rejected = total(rows.iter().map(|r| r.raw.rejected));
    let rework = total(
        rows.iter()
            .map(|r| r.raw.reanalysis.saturating_add(r.raw.retest)),
    );
    let whole = total([approved, rejected, rework]);

    [
        (BatchStatus::Approved, approved),
        (BatchStatus::Rejected, rejected),
        (BatchStatus::Rework, rework),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(status, count)| StatusSlice {
        status,
        count,
        share: rate(count, whole),
    })
    .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_aggregate.rs"]
mod tests;
