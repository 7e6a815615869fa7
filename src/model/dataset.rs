use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::record::StudyRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Remote,
    Local,
    Error,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Remote => "remote",
            Provenance::Local => "local",
            Provenance::Error => "error",
        }
    }
}

/// The canonical in-process table. Rows are shared and never mutated; a
/// refresh replaces the whole value.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[StudyRecord]>,
    pub provenance: Provenance,
    pub freshness: Option<NaiveDateTime>,
}

impl Dataset {
    pub fn new(records: Vec<StudyRecord>, provenance: Provenance) -> Self {
        let freshness = records.iter().filter_map(|r| r.last_update).max();
        Self {
            records: records.into(),
            provenance,
            freshness,
        }
    }

    pub fn empty() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            provenance: Provenance::Error,
            freshness: None,
        }
    }

    pub fn records(&self) -> &[StudyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Staleness {
    Fresh,
    Delayed,
    Stale,
    Critical,
    Unknown,
}

pub const DELAYED_AFTER_DAYS: i64 = 3;
pub const STALE_AFTER_DAYS: i64 = 7;
pub const CRITICAL_AFTER_DAYS: i64 = 30;

impl Staleness {
    pub fn classify(freshness: Option<NaiveDateTime>, now: NaiveDateTime) -> (Self, Option<i64>) {
        let Some(last) = freshness else {
            return (Staleness::Unknown, None);
        };
        let days = (now - last).num_days();
        let level = if days > CRITICAL_AFTER_DAYS {
            Staleness::Critical
        } else if days > STALE_AFTER_DAYS {
            Staleness::Stale
        } else if days > DELAYED_AFTER_DAYS {
            Staleness::Delayed
        } else {
            Staleness::Fresh
        };
        (level, Some(days))
    }
}
