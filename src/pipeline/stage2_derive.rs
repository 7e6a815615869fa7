use chrono::NaiveDateTime;

use crate::model::record::{RawRecord, StudyRecord};

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn derive(raw: Vec<RawRecord>) -> Vec<StudyRecord> {
    raw.into_iter().map(derive_record).collect()
}

pub fn derive_record(raw: RawRecord) -> StudyRecord {
    let year = raw.study_code.as_deref().and_then(study_year);
    let company_name = match &raw.company_label {
        Some(label) => Some(label.clone()),
        None => raw.company_code.as_deref().map(company_name),
    };
    let last_update = raw.last_update_raw.as_deref().and_then(parse_timestamp);
    StudyRecord {
        raw,
        year,
        company_name,
        last_update,
    }
}

/// `001.001.24` -> `2024`. The last dot segment is the two-digit year.
pub fn study_year(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    let suffix = code.rsplit('.').next()?.trim();
    if suffix.is_empty() {
        return None;
    }
    Some(format!("20{suffix}"))
}

/// `010_ACME` -> `ACME`; codes without an underscore pass through.
pub fn company_name(code: &str) -> String {
    match code.split_once('_') {
        Some((_, name)) => name.to_string(),
        None => code.to_string(),
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        Ok(ts) => Some(ts),
        Err(err) => {
            tracing::debug!("unparsable timestamp {value:?}: {err}");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_derive.rs"]
mod tests;
