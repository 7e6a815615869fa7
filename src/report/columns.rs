use crate::model::record::StudyRecord;

pub const WIDTH_PADDING: usize = 2;
pub const MAX_COLUMN_WIDTH: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Percentage,
    Identifier,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportColumn {
    Company,
    Study,
    FileRef,
    TotalBatches,
    Approved,
    ApprovedPct,
    Rejected,
    RejectedPct,
    Aliquoting,
    Spiking,
    Extraction,
    Injection,
    RawData,
    Completeness,
}

pub const FULL_VIEW_COLUMNS: [ExportColumn; 14] = [
    ExportColumn::Company,
    ExportColumn::Study,
    ExportColumn::FileRef,
    ExportColumn::TotalBatches,
    ExportColumn::Approved,
    ExportColumn::ApprovedPct,
    ExportColumn::Rejected,
    ExportColumn::RejectedPct,
    ExportColumn::Aliquoting,
    ExportColumn::Spiking,
    ExportColumn::Extraction,
    ExportColumn::Injection,
    ExportColumn::RawData,
    ExportColumn::Completeness,
];

pub const CRITICAL_VIEW_COLUMNS: [ExportColumn; 9] = [
    ExportColumn::Company,
    ExportColumn::Study,
    ExportColumn::FileRef,
    ExportColumn::TotalBatches,
    ExportColumn::Approved,
    ExportColumn::ApprovedPct,
    ExportColumn::Rejected,
    ExportColumn::RejectedPct,
    ExportColumn::Completeness,
];

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Count(u64),
    Percent(f64),
}

impl CellValue {
    /// Text as it appears in the sheet and in the delimited file.
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Count(n) => n.to_string(),
            CellValue::Percent(v) => format!("{v:.2}"),
        }
    }
}

impl ExportColumn {
    pub fn label(self) -> &'static str {
        match self {
            ExportColumn::Company => "Company",
            ExportColumn::Study => "Study",
            ExportColumn::FileRef => "File",
            ExportColumn::TotalBatches => "Total Batches",
            ExportColumn::Approved => "Approved",
            ExportColumn::ApprovedPct => "% Approved",
            ExportColumn::Rejected => "Rejected",
            ExportColumn::RejectedPct => "% Rejected",
            ExportColumn::Aliquoting => "% Aliquoting",
            ExportColumn::Spiking => "% Spiking",
            ExportColumn::Extraction => "% Extraction",
            ExportColumn::Injection => "% Injection",
            ExportColumn::RawData => "% Raw Data",
            ExportColumn::Completeness => "% Completeness",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            ExportColumn::Company | ExportColumn::Study | ExportColumn::FileRef => {
                ColumnKind::Identifier
            }
            ExportColumn::TotalBatches | ExportColumn::Approved | ExportColumn::Rejected => {
                ColumnKind::Numeric
            }
            ExportColumn::ApprovedPct
            | ExportColumn::RejectedPct
            | ExportColumn::Aliquoting
            | ExportColumn::Spiking
            | ExportColumn::Extraction
            | ExportColumn::Injection
            | ExportColumn::RawData
            | ExportColumn::Completeness => ColumnKind::Percentage,
        }
    }

    /// Identifier columns hold abbreviated codes; keep them readable even
    /// when every value in the sheet is short.
    pub fn min_width(self) -> Option<usize> {
        match self {
            ExportColumn::Company => Some(18),
            ExportColumn::Study => Some(15),
            ExportColumn::FileRef => Some(35),
            _ => None,
        }
    }

    pub fn value(self, record: &StudyRecord) -> CellValue {
        let raw = &record.raw;
        match self {
            ExportColumn::Company => CellValue::Text(record.company().unwrap_or_default().to_string()),
            ExportColumn::Study => CellValue::Text(record.study().unwrap_or_default().to_string()),
            ExportColumn::FileRef => CellValue::Text(raw.file_ref.clone()),
            ExportColumn::TotalBatches => CellValue::Count(raw.total_batches),
            ExportColumn::Approved => CellValue::Count(raw.approved),
            ExportColumn::ApprovedPct => CellValue::Percent(raw.approved_pct),
            ExportColumn::Rejected => CellValue::Count(raw.rejected),
            ExportColumn::RejectedPct => CellValue::Percent(raw.rejected_pct),
            ExportColumn::Aliquoting => CellValue::Percent(raw.stages.aliquoting),
            ExportColumn::Spiking => CellValue::Percent(raw.stages.spiking),
            ExportColumn::Extraction => CellValue::Percent(raw.stages.extraction),
            ExportColumn::Injection => CellValue::Percent(raw.stages.injection),
            ExportColumn::RawData => CellValue::Percent(raw.stages.raw_data),
            ExportColumn::Completeness => CellValue::Percent(raw.completeness_pct),
        }
    }
}

/// Width per column: longest of label and rendered values plus padding,
/// capped, then raised to the column's minimum.
pub fn column_widths(columns: &[ExportColumn], rows: &[StudyRecord]) -> Vec<usize> {
    columns
        .iter()
        .map(|&col| {
            let longest = rows
                .iter()
                .map(|r| col.value(r).render().chars().count())
                .fold(col.label().chars().count(), usize::max);
            let width = (longest + WIDTH_PADDING).min(MAX_COLUMN_WIDTH);
            col.min_width().map_or(width, |min| width.max(min))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/columns.rs"]
mod tests;
