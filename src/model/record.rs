use chrono::NaiveDateTime;
use serde::Serialize;

/// One source row as read from the delimited file, before derivation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub study_code: Option<String>,
    pub company_code: Option<String>,
    /// Display name supplied by the input itself (re-read exports).
    pub company_label: Option<String>,
    pub file_ref: String,
    pub description: Option<String>,

    pub total_batches: u64,
    pub approved: u64,
    pub rejected: u64,
    pub reanalysis: u64,
    pub retest: u64,

    pub approved_pct: f64,
    pub rejected_pct: f64,
    pub stages: StageCompletion,
    pub completeness_pct: f64,

    pub last_update_raw: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StageCompletion {
    pub aliquoting: f64,
    pub spiking: f64,
    pub extraction: f64,
    pub injection: f64,
    pub raw_data: f64,
}

impl StageCompletion {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.aliquoting,
            self.spiking,
            self.extraction,
            self.injection,
            self.raw_data,
        ]
    }
}

pub const STAGE_NAMES: [&str; 5] = ["Aliquoting", "Spiking", "Extraction", "Injection", "Raw data"];

/// A source row enriched with the fields derived from its codes.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyRecord {
    pub raw: RawRecord,
    pub year: Option<String>,
    pub company_name: Option<String>,
    pub last_update: Option<NaiveDateTime>,
}

impl StudyRecord {
    pub fn study(&self) -> Option<&str> {
        self.raw.study_code.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn has_batches(&self) -> bool {
        self.raw.total_batches > 0
    }
}
