use super::*;
use crate::model::record::RawRecord;
use crate::pipeline::stage2_derive::derive_record;

fn record(company: &str, study: &str, file: &str) -> StudyRecord {
    derive_record(RawRecord {
        study_code: Some(study.to_string()),
        company_code: Some(company.to_string()),
        file_ref: file.to_string(),
        total_batches: 12,
        approved_pct: 91.666,
        ..RawRecord::default()
    })
}

#[test]
fn test_column_classification() {
    assert_eq!(ExportColumn::Company.kind(), ColumnKind::Identifier);
    assert_eq!(ExportColumn::FileRef.kind(), ColumnKind::Identifier);
    assert_eq!(ExportColumn::TotalBatches.kind(), ColumnKind::Numeric);
    assert_eq!(ExportColumn::Rejected.kind(), ColumnKind::Numeric);
    assert_eq!(ExportColumn::RawData.kind(), ColumnKind::Percentage);
    assert_eq!(ExportColumn::Completeness.kind(), ColumnKind::Percentage);
    for column in FULL_VIEW_COLUMNS {
        assert_eq!(
            column.kind() == ColumnKind::Percentage,
            column.label().starts_with('%'),
            "{column:?}"
        );
    }
}

#[test]
fn test_critical_columns_are_subset_of_full() {
    assert!(
        CRITICAL_VIEW_COLUMNS
            .iter()
            .all(|c| FULL_VIEW_COLUMNS.contains(c))
    );
    assert!(!CRITICAL_VIEW_COLUMNS.contains(&ExportColumn::Aliquoting));
}

#[test]
fn test_cell_rendering() {
    let rec = record("010_ACME", "001.001.24", "ELN-001");
    assert_eq!(ExportColumn::Company.value(&rec).render(), "ACME");
    assert_eq!(ExportColumn::TotalBatches.value(&rec).render(), "12");
    assert_eq!(ExportColumn::ApprovedPct.value(&rec).render(), "91.67");
    assert_eq!(ExportColumn::Spiking.value(&rec).render(), "0.00");
}

#[test]
fn test_widths_respect_identifier_minimums() {
    let rows = vec![record("010_A", "1.1.24", "F")];
    let widths = column_widths(&FULL_VIEW_COLUMNS, &rows);
    assert_eq!(widths[0], 18);
    assert_eq!(widths[1], 15);
    assert_eq!(widths[2], 35);
    // "Total Batches" (13) + padding.
    assert_eq!(widths[3], 15);
    // "% Completeness" (14) + padding.
    assert_eq!(widths[13], 16);
}

#[test]
fn test_widths_are_capped() {
    let long = "X".repeat(60);
    let rows = vec![record(&format!("010_{long}"), &long, &long)];
    let widths = column_widths(&FULL_VIEW_COLUMNS, &rows);
    assert_eq!(widths[0], MAX_COLUMN_WIDTH);
    assert_eq!(widths[1], MAX_COLUMN_WIDTH);
    // The file minimum exceeds the cap and wins.
    assert_eq!(widths[2], 35);
}

#[test]
fn test_widths_without_rows_follow_labels() {
    let widths = column_widths(&CRITICAL_VIEW_COLUMNS, &[]);
    assert_eq!(widths.len(), CRITICAL_VIEW_COLUMNS.len());
    assert_eq!(widths[4], "Approved".len() + WIDTH_PADDING);
}
