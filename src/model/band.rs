use serde::Serialize;

use crate::model::thresholds::BandThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    Good,
    Borderline,
    Poor,
}

impl StatusBand {
    pub fn label(self) -> &'static str {
        match self {
            StatusBand::Good => "good",
            StatusBand::Borderline => "borderline",
            StatusBand::Poor => "poor",
        }
    }
}

pub fn band(value: f64, thresholds: BandThresholds) -> StatusBand {
    if value >= thresholds.upper {
        StatusBand::Good
    } else if value >= thresholds.lower {
        StatusBand::Borderline
    } else {
        StatusBand::Poor
    }
}
