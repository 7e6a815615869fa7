use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::input::Resolution;
use crate::model::dataset::Staleness;
use crate::model::record::StudyRecord;
use crate::pipeline::stage3_filter::{FilterState, classify_critical, critical_view, full_view};
use crate::pipeline::stage4_aggregate::{
    aggregate_by_company, completeness_by_company, stage_means, status_distribution, summarize,
};
use crate::report::columns::FULL_VIEW_COLUMNS;
use crate::report::delimited::export_delimited_text;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::xlsx::export_workbook;
use crate::report::{
    CriticalRow, ExportError, ExportSummary, PRODUCT, SourceSummary, SummaryData,
    export_file_name, format_timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Both,
    None,
}

impl ExportFormat {
    fn workbook(self) -> bool {
        matches!(self, ExportFormat::Xlsx | ExportFormat::Both)
    }

    fn delimited(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }
}

#[derive(Debug, Clone)]
pub struct Stage5Input<'a> {
    pub resolution: &'a Resolution,
    pub filters: &'a FilterState,
    pub filtered: &'a [StudyRecord],
    pub generated_at: NaiveDateTime,
    pub tool_name: String,
    pub tool_version: String,
}

#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub summary_json: PathBuf,
    pub report_txt: PathBuf,
    pub workbook: Option<PathBuf>,
    pub delimited: Option<PathBuf>,
}

pub fn write_reports(
    input: &Stage5Input<'_>,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<(SummaryData, ReportArtifacts), ExportError> {
    fs::create_dir_all(out_dir)?;

    let full = full_view(input.filtered);
    let critical = critical_view(input.filtered);
    let mut exports = ExportSummary {
        full_rows: full.len(),
        critical_rows: classify_critical(&full).len(),
        ..ExportSummary::default()
    };

    let mut workbook = None;
    if format.workbook() {
        match export_workbook(&full, &critical, input.generated_at) {
            Ok(bytes) => {
                let path = out_dir.join(export_file_name(PRODUCT, input.generated_at, "xlsx"));
                fs::write(&path, bytes)?;
                tracing::info!(path = %path.display(), "workbook written");
                workbook = Some(path);
            }
            Err(ExportError::Unavailable) => {
                tracing::warn!("workbook export unavailable; writing delimited text only");
                exports.workbook_unavailable = true;
            }
            Err(err) => {
                tracing::error!("workbook export failed: {err}");
                exports.workbook_unavailable = true;
            }
        }
    }

    let mut delimited = None;
    if format.delimited() || exports.workbook_unavailable {
        let bytes = export_delimited_text(&FULL_VIEW_COLUMNS, &full)?;
        let path = out_dir.join(export_file_name(PRODUCT, input.generated_at, "csv"));
        fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), "delimited export written");
        delimited = Some(path);
    }

    exports.workbook = workbook.as_ref().map(|p| p.display().to_string());
    exports.delimited = delimited.as_ref().map(|p| p.display().to_string());

    let summary = build_summary(input, &critical, exports);

    let summary_json = out_dir.join("summary.json");
    fs::write(&summary_json, render_summary_json(&summary)?)?;

    let report_txt = out_dir.join("report.txt");
    fs::write(&report_txt, render_report_text(&summary))?;

    Ok((
        summary,
        ReportArtifacts {
            summary_json,
            report_txt,
            workbook,
            delimited,
        },
    ))
}

pub fn build_summary(
    input: &Stage5Input<'_>,
    critical: &[StudyRecord],
    exports: ExportSummary,
) -> SummaryData {
    let dataset = &input.resolution.dataset;
    let (staleness, days_since_update) = Staleness::classify(dataset.freshness, input.generated_at);

    SummaryData {
        tool: input.tool_name.clone(),
        tool_version: input.tool_version.clone(),
        generated_at: format_timestamp(input.generated_at),
        source: SourceSummary {
            provenance: dataset.provenance,
            warning: input.resolution.warning.as_ref().map(|w| w.to_string()),
            skipped_rows: input.resolution.skipped_rows,
            last_update: dataset.freshness.map(format_timestamp),
            staleness,
            days_since_update,
        },
        filters: input.filters.clone(),
        rows_total: dataset.len(),
        rows_filtered: input.filtered.len(),
        kpis: summarize(input.filtered),
        pipeline: stage_means(input.filtered),
        approval_by_company: aggregate_by_company(input.filtered),
        completeness_by_company: completeness_by_company(input.filtered),
        status_distribution: status_distribution(input.filtered),
        critical: critical
            .iter()
            .map(|r| CriticalRow {
                company: r.company().unwrap_or_default().to_string(),
                study: r.study().unwrap_or_default().to_string(),
                file: r.raw.file_ref.clone(),
                total_batches: r.raw.total_batches,
                approved_pct: r.raw.approved_pct,
                completeness_pct: r.raw.completeness_pct,
            })
            .collect(),
        exports,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
