use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::model::dataset::{Provenance, Staleness};
use crate::pipeline::stage3_filter::FilterState;
use crate::pipeline::stage4_aggregate::{
    CompanyAggregate, CompanyCompleteness, KpiSummary, StageMean, StatusSlice,
};

pub mod columns;
pub mod delimited;
pub mod json;
pub mod text;
pub mod xlsx;

pub const PRODUCT: &str = "synvia_eln";
pub const DISPLAY_TIMESTAMP: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("workbook export unavailable: built without the `xlsx` feature")]
    Unavailable,
    #[cfg(feature = "xlsx")]
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub provenance: Provenance,
    pub warning: Option<String>,
    pub skipped_rows: usize,
    pub last_update: Option<String>,
    pub staleness: Staleness,
    pub days_since_update: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriticalRow {
    pub company: String,
    pub study: String,
    pub file: String,
    pub total_batches: u64,
    pub approved_pct: f64,
    pub completeness_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    pub full_rows: usize,
    pub critical_rows: usize,
    pub workbook: Option<String>,
    pub delimited: Option<String>,
    pub workbook_unavailable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: String,
    pub tool_version: String,
    pub generated_at: String,
    pub source: SourceSummary,
    pub filters: FilterState,
    pub rows_total: usize,
    pub rows_filtered: usize,
    pub kpis: KpiSummary,
    pub pipeline: Vec<StageMean>,
    pub approval_by_company: Vec<CompanyAggregate>,
    pub completeness_by_company: Vec<CompanyCompleteness>,
    pub status_distribution: Vec<StatusSlice>,
    pub critical: Vec<CriticalRow>,
    pub exports: ExportSummary,
}

/// `{product}_{YYYYMMDD_HHMM}.{ext}`
pub fn export_file_name(product: &str, at: NaiveDateTime, ext: &str) -> String {
    format!("{product}_{}.{ext}", at.format("%Y%m%d_%H%M"))
}

pub fn format_pct(v: f64) -> String {
    format!("{:.1}%", v)
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(DISPLAY_TIMESTAMP).to_string()
}
