pub mod stage2_derive;
pub mod stage3_filter;
pub mod stage4_aggregate;
pub mod stage5_report;
