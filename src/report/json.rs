use crate::report::{ExportError, SummaryData};

pub fn render_summary_json(data: &SummaryData) -> Result<String, ExportError> {
    let mut out = serde_json::to_string_pretty(data)?;
    out.push('\n');
    Ok(out)
}
