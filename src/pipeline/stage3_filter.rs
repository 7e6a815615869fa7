use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::record::StudyRecord;
use crate::model::thresholds::{CRITICAL_VIEW_LIMIT, is_critical};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `None`, an empty value and the usual "all" spellings select everything.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Selection::All,
            Some(v)
                if v.is_empty()
                    || ["all", "todas", "todos"]
                        .iter()
                        .any(|all| v.eq_ignore_ascii_case(all)) =>
            {
                Selection::All
            }
            Some(v) => Selection::Only(v.to_string()),
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterState {
    pub company: Selection,
    pub year: Selection,
    pub study: Selection,
    pub min_completeness: f64,
    pub critical_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Company(String),
    Year(String),
    Study(String),
    MinCompleteness(f64),
    CriticalOnly,
}

impl Predicate {
    /// Rows missing the field a predicate keys on never match it.
    pub fn matches(&self, record: &StudyRecord) -> bool {
        match self {
            Predicate::Company(want) => record.company() == Some(want.as_str()),
            Predicate::Year(want) => record.year.as_deref() == Some(want.as_str()),
            Predicate::Study(want) => record.study() == Some(want.as_str()),
            Predicate::MinCompleteness(min) => record.raw.completeness_pct >= *min,
            Predicate::CriticalOnly => is_critical(record),
        }
    }
}

impl FilterState {
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Selection::Only(v) = &self.company {
            out.push(Predicate::Company(v.clone()));
        }
        if let Selection::Only(v) = &self.year {
            out.push(Predicate::Year(v.clone()));
        }
        if let Selection::Only(v) = &self.study {
            out.push(Predicate::Study(v.clone()));
        }
        if self.min_completeness > 0.0 {
            out.push(Predicate::MinCompleteness(self.min_completeness));
        }
        if self.critical_only {
            out.push(Predicate::CriticalOnly);
        }
        out
    }
}

pub fn apply_predicates(rows: &[StudyRecord], predicates: &[Predicate]) -> Vec<StudyRecord> {
    rows.iter()
        .filter(|r| predicates.iter().all(|p| p.matches(r)))
        .cloned()
        .collect()
}

pub fn apply_filters(rows: &[StudyRecord], state: &FilterState) -> Vec<StudyRecord> {
    let out = apply_predicates(rows, &state.predicates());
    tracing::debug!(input = rows.len(), kept = out.len(), "filters applied");
    out
}

pub fn classify_critical(rows: &[StudyRecord]) -> Vec<StudyRecord> {
    apply_predicates(rows, &[Predicate::CriticalOnly])
}

/// Rows with batches, highest completeness first.
pub fn full_view(rows: &[StudyRecord]) -> Vec<StudyRecord> {
    let mut out: Vec<StudyRecord> = rows.iter().filter(|r| r.has_batches()).cloned().collect();
    out.sort_by(|a, b| desc(a.raw.completeness_pct, b.raw.completeness_pct));
    out
}

/// Critical rows with batches, lowest approval first, capped.
pub fn critical_view(rows: &[StudyRecord]) -> Vec<StudyRecord> {
    let mut out: Vec<StudyRecord> = classify_critical(rows)
        .into_iter()
        .filter(StudyRecord::has_batches)
        .collect();
    out.sort_by(|a, b| asc(a.raw.approved_pct, b.raw.approved_pct));
    out.truncate(CRITICAL_VIEW_LIMIT);
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub companies: Vec<String>,
    pub years: Vec<String>,
    pub studies: Vec<String>,
}

/// Values offered for each selector. Studies narrow to the chosen company.
pub fn filter_options(rows: &[StudyRecord], company: &Selection) -> FilterOptions {
    let companies: BTreeSet<&str> = rows.iter().filter_map(StudyRecord::company).collect();
    let years: BTreeSet<&str> = rows.iter().filter_map(|r| r.year.as_deref()).collect();
    let studies: BTreeSet<&str> = rows
        .iter()
        .filter(|r| match company {
            Selection::All => true,
            Selection::Only(c) => r.company() == Some(c.as_str()),
        })
        .filter_map(StudyRecord::study)
        .collect();

    FilterOptions {
        companies: companies.into_iter().map(str::to_string).collect(),
        years: years.into_iter().rev().map(str::to_string).collect(),
        studies: studies.into_iter().map(str::to_string).collect(),
    }
}

fn asc(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn desc(a: f64, b: f64) -> Ordering {
    asc(b, a)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_filter.rs"]
mod tests;
