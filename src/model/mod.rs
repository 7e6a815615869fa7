pub mod band;
pub mod dataset;
pub mod record;
pub mod thresholds;
