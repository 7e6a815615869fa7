use crate::model::dataset::Staleness;
use crate::pipeline::stage3_filter::Selection;
use crate::report::{SummaryData, format_pct};

pub fn render_report_text(data: &SummaryData) -> String {
    let mut out = String::new();

    out.push_str("Quality Control Report - Bioequivalence Studies\n");
    out.push_str("===============================================\n\n");

    out.push_str("1. Data source\n");
    out.push_str(&format!("Source: {}\n", data.source.provenance.label()));
    if let Some(warning) = &data.source.warning {
        out.push_str(&format!("Warning: {}\n", warning));
    }
    if data.source.skipped_rows > 0 {
        out.push_str(&format!(
            "Skipped malformed rows: {}\n",
            data.source.skipped_rows
        ));
    }
    out.push_str(&format!(
        "Last update: {}\n",
        data.source.last_update.as_deref().unwrap_or("N/A")
    ));
    if let Some(line) = staleness_statement(data.source.staleness, data.source.days_since_update) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!("Generated: {}\n\n", data.generated_at));

    out.push_str("2. Filters\n");
    out.push_str(&format!("Company: {}\n", selection(&data.filters.company)));
    out.push_str(&format!("Year: {}\n", selection(&data.filters.year)));
    out.push_str(&format!("Study: {}\n", selection(&data.filters.study)));
    out.push_str(&format!(
        "Minimum completeness: {}\n",
        format_pct(data.filters.min_completeness)
    ));
    out.push_str(&format!(
        "Critical only: {}\n",
        if data.filters.critical_only { "yes" } else { "no" }
    ));
    out.push_str(&format!(
        "Rows: {} of {}\n\n",
        data.rows_filtered, data.rows_total
    ));

    let k = &data.kpis;
    out.push_str("3. Key indicators\n");
    out.push_str(&format!("Total batches: {}\n", k.total_batches));
    out.push_str(&format!("Approval rate: {}\n", format_pct(k.approval_rate)));
    out.push_str(&format!("Rejection rate: {}\n", format_pct(k.rejection_rate)));
    out.push_str(&format!(
        "Mean completeness: {}\n",
        format_pct(k.mean_completeness)
    ));
    out.push_str(&format!("Studies: {}\n", k.unique_studies));
    out.push_str(&format!("Companies: {}\n\n", k.unique_companies));

    out.push_str("4. Analytical pipeline\n");
    for stage in &data.pipeline {
        out.push_str(&format!("{}: {}\n", stage.stage, format_pct(stage.mean)));
    }
    out.push('\n');

    out.push_str("5. Approval rate by company\n");
    if data.approval_by_company.is_empty() {
        out.push_str("(no companies with batches)\n");
    }
    for agg in &data.approval_by_company {
        out.push_str(&format!(
            "{}: {} ({}/{} batches, {})\n",
            agg.company,
            format_pct(agg.approval_rate),
            agg.approved,
            agg.total_batches,
            agg.band.label()
        ));
    }
    out.push('\n');

    out.push_str("6. Completeness by company\n");
    for c in &data.completeness_by_company {
        out.push_str(&format!(
            "{}: {} ({})\n",
            c.company,
            format_pct(c.mean_completeness),
            c.band.label()
        ));
    }
    out.push('\n');

    out.push_str("7. Batch status distribution\n");
    for slice in &data.status_distribution {
        out.push_str(&format!(
            "{:?}: {} ({})\n",
            slice.status,
            slice.count,
            format_pct(slice.share)
        ));
    }
    out.push('\n');

    out.push_str("8. Studies requiring attention\n");
    if data.critical.is_empty() {
        out.push_str("No critical studies found for the current filters.\n");
    }
    for row in &data.critical {
        out.push_str(&format!(
            "{} {} [{}]: approval {}, completeness {}\n",
            row.company,
            row.study,
            row.file,
            format_pct(row.approved_pct),
            format_pct(row.completeness_pct)
        ));
    }
    out.push('\n');

    out.push_str("9. Exports\n");
    out.push_str(&format!(
        "{} records | {} critical\n",
        data.exports.full_rows, data.exports.critical_rows
    ));
    if let Some(path) = &data.exports.workbook {
        out.push_str(&format!("Workbook: {}\n", path));
    }
    if data.exports.workbook_unavailable {
        out.push_str("Workbook: unavailable in this build\n");
    }
    if let Some(path) = &data.exports.delimited {
        out.push_str(&format!("CSV: {}\n", path));
    }

    out
}

fn selection(value: &Selection) -> &str {
    value.as_option().unwrap_or("All")
}

fn staleness_statement(level: Staleness, days: Option<i64>) -> Option<String> {
    let days = days?;
    match level {
        Staleness::Critical => Some(format!(
            "ATTENTION: data is {days} days old; request a refresh of the source file."
        )),
        Staleness::Stale => Some(format!("ATTENTION: data is {days} days old.")),
        Staleness::Delayed => Some(format!("Data is {days} days behind.")),
        Staleness::Fresh | Staleness::Unknown => None,
    }
}
