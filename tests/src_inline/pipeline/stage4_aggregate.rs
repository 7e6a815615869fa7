use super::*;
use crate::model::record::{RawRecord, StageCompletion};
use crate::pipeline::stage2_derive::derive_record;

fn record(study: &str, company: &str, total: u64, approved: u64, rejected: u64) -> StudyRecord {
    derive_record(RawRecord {
        study_code: Some(study.to_string()),
        company_code: Some(company.to_string()),
        total_batches: total,
        approved,
        rejected,
        approved_pct: rate(approved, total),
        rejected_pct: rate(rejected, total),
        ..RawRecord::default()
    })
}

fn with_completeness(mut rec: StudyRecord, completeness: f64) -> StudyRecord {
    rec.raw.completeness_pct = completeness;
    rec
}

#[test]
fn test_rate_zero_denominator() {
    assert_eq!(rate(0, 0), 0.0);
    assert_eq!(rate(5, 0), 0.0);
    assert_eq!(rate(1, 4), 25.0);
}

#[test]
fn test_aggregate_by_company_pools_batches() {
    let rows = vec![
        record("001.001.24", "010_ACME", 10, 10, 0),
        record("002.001.24", "010_ACME", 10, 9, 1),
        record("003.001.24", "020_BETA", 10, 5, 5),
    ];
    let out = aggregate_by_company(&rows);
    assert_eq!(out.len(), 2);

    // Lowest approval first.
    assert_eq!(out[0].company, "BETA");
    assert_eq!(out[0].approval_rate, 50.0);
    assert_eq!(out[0].band, StatusBand::Poor);

    let acme = &out[1];
    assert_eq!(acme.company, "ACME");
    assert_eq!(acme.studies, 2);
    assert_eq!(acme.total_batches, 20);
    assert_eq!(acme.approved, 19);
    assert_eq!(acme.approval_rate, 95.0);
    assert_eq!(acme.band, StatusBand::Good);
}

#[test]
fn test_aggregate_drops_companies_without_batches() {
    let rows = vec![
        record("001.001.24", "010_ACME", 0, 0, 0),
        record("002.001.24", "020_BETA", 4, 3, 1),
    ];
    let out = aggregate_by_company(&rows);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].company, "BETA");
    assert_eq!(out[0].band, StatusBand::Borderline);
}

#[test]
fn test_aggregate_with_custom_thresholds() {
    let rows = vec![record("001.001.24", "010_ACME", 10, 8, 2)];
    let strict = aggregate_by_company_with(&rows, BandThresholds::new(85.0, 95.0));
    assert_eq!(strict[0].band, StatusBand::Poor);
    let default = aggregate_by_company(&rows);
    assert_eq!(default[0].band, StatusBand::Borderline);
}

#[test]
fn test_completeness_by_company_ranked_and_banded() {
    let rows = vec![
        with_completeness(record("001.001.24", "010_ACME", 5, 5, 0), 90.0),
        with_completeness(record("002.001.24", "010_ACME", 5, 5, 0), 70.0),
        with_completeness(record("003.001.24", "020_BETA", 5, 5, 0), 95.0),
        with_completeness(record("004.001.24", "030_GAMA", 5, 5, 0), 50.0),
        with_completeness(record("005.001.24", "040_DELTA", 0, 0, 0), 100.0),
    ];
    let out = completeness_by_company(&rows);
    let names: Vec<&str> = out.iter().map(|c| c.company.as_str()).collect();
    assert_eq!(names, ["BETA", "ACME", "GAMA"]);
    assert_eq!(out[1].mean_completeness, 80.0);
    assert_eq!(out[1].band, StatusBand::Good);
    assert_eq!(out[2].band, StatusBand::Poor);
}

#[test]
fn test_completeness_ranking_is_capped() {
    let rows: Vec<StudyRecord> = (0..20)
        .map(|i| {
            with_completeness(
                record(&format!("{i:03}.001.24"), &format!("{i:03}_CO{i}"), 1, 1, 0),
                i as f64,
            )
        })
        .collect();
    let out = completeness_by_company(&rows);
    assert_eq!(out.len(), COMPLETENESS_RANKING_LIMIT);
    assert_eq!(out[0].mean_completeness, 19.0);
}

#[test]
fn test_summarize() {
    let rows = vec![
        with_completeness(record("001.001.24", "010_ACME", 10, 8, 2), 90.0),
        with_completeness(record("001.001.24", "010_ACME", 10, 10, 0), 70.0),
        with_completeness(record("002.001.23", "020_BETA", 0, 0, 0), 20.0),
    ];
    let k = summarize(&rows);
    assert_eq!(k.rows, 3);
    assert_eq!(k.total_batches, 20);
    assert_eq!(k.approval_rate, 90.0);
    assert_eq!(k.rejection_rate, 10.0);
    assert_eq!(k.mean_completeness, 60.0);
    assert_eq!(k.unique_studies, 2);
    assert_eq!(k.unique_companies, 2);

    assert_eq!(summarize(&[]), KpiSummary::default());
}

#[test]
fn test_stage_means() {
    let mut a = record("001.001.24", "010_ACME", 1, 1, 0);
    a.raw.stages = StageCompletion {
        aliquoting: 100.0,
        spiking: 80.0,
        extraction: 60.0,
        injection: 40.0,
        raw_data: 20.0,
    };
    let mut b = record("002.001.24", "010_ACME", 1, 1, 0);
    b.raw.stages = StageCompletion {
        aliquoting: 50.0,
        ..StageCompletion::default()
    };
    let means = stage_means(&[a, b]);
    let values: Vec<f64> = means.iter().map(|m| m.mean).collect();
    assert_eq!(values, [75.0, 40.0, 30.0, 20.0, 10.0]);
    assert_eq!(means[0].stage, "Aliquoting");
    assert_eq!(means[4].stage, "Raw data");

    assert!(stage_means(&[]).iter().all(|m| m.mean == 0.0));
}

#[test]
fn test_status_distribution() {
    let mut a = record("001.001.24", "010_ACME", 10, 6, 2);
    a.raw.reanalysis = 1;
    a.raw.retest = 1;
    let out = status_distribution(&[a]);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].status, BatchStatus::Approved);
    assert_eq!(out[0].share, 60.0);
    assert_eq!(out[2].status, BatchStatus::Rework);
    assert_eq!(out[2].count, 2);

    let only_approved = status_distribution(&[record("002.001.24", "010_ACME", 3, 3, 0)]);
    assert_eq!(only_approved.len(), 1);
    assert_eq!(only_approved[0].share, 100.0);
}

#[test]
fn test_huge_counts_saturate() {
    let rows = vec![
        record("001.001.24", "010_ACME", u64::MAX, u64::MAX, 0),
        record("002.001.24", "010_ACME", 1, 1, 0),
    ];
    let k = summarize(&rows);
    assert_eq!(k.total_batches, u64::MAX);
    assert_eq!(k.approved, u64::MAX);

    let agg = aggregate_by_company(&rows);
    assert_eq!(agg[0].total_batches, u64::MAX);
    assert_eq!(agg[0].approval_rate, 100.0);

    let mut a = record("003.001.24", "020_BETA", 1, 0, 0);
    a.raw.reanalysis = u64::MAX;
    a.raw.retest = 1;
    let out = status_distribution(&[a]);
    assert_eq!(out[0].status, BatchStatus::Rework);
    assert_eq!(out[0].count, u64::MAX);
    assert_eq!(completeness_by_company(&rows)[0].total_batches, u64::MAX);
}
