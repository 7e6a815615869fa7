pub const FULL_VIEW_SHEET: &str = "Full View";
pub const CRITICAL_SHEET: &str = "Critical Studies";

#[cfg(not(feature = "xlsx"))]
pub fn export_workbook(
    _full: &[crate::model::record::StudyRecord],
    _critical: &[crate::model::record::StudyRecord],
    _generated_at: chrono::NaiveDateTime,
) -> Result<Vec<u8>, crate::report::ExportError> {
    Err(crate::report::ExportError::Unavailable)
}

#[cfg(feature = "xlsx")]
pub use styled::export_workbook;

#[cfg(feature = "xlsx")]
mod styled {
    use chrono::NaiveDateTime;
    use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

    use super::{CRITICAL_SHEET, FULL_VIEW_SHEET};
    use crate::model::band::{StatusBand, band};
    use crate::model::record::StudyRecord;
    use crate::model::thresholds::BandThresholds;
    use crate::report::ExportError;
    use crate::report::columns::{
        CRITICAL_VIEW_COLUMNS, CellValue, ColumnKind, ExportColumn, FULL_VIEW_COLUMNS,
        column_widths,
    };

    const TITLE_ROW: u32 = 0;
    const SUBTITLE_ROW: u32 = 1;
    const HEADER_ROW: u32 = 3;
    const FIRST_DATA_ROW: u32 = HEADER_ROW + 1;

    const BRAND: u32 = 0x1E3A5F;
    const GRID: u32 = 0xCCCCCC;
    const GOOD_FILL: u32 = 0xC6EFCE;
    const CAUTION_FILL: u32 = 0xFFEB9C;
    const RISK_FILL: u32 = 0xFFC7CE;
    const CRITICAL_TAB: u32 = 0xFF6B6B;

    struct Formats {
        title: Format,
        subtitle: Format,
        header: Format,
        text: Format,
        count: Format,
        good: Format,
        caution: Format,
        risk: Format,
        notice: Format,
    }

    impl Formats {
        fn new() -> Self {
            let cell = Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::RGB(GRID));
            let pct = cell.clone().set_num_format("0.00");

            Self {
                title: Format::new()
                    .set_bold()
                    .set_font_size(16)
                    .set_font_color(Color::RGB(BRAND))
                    .set_align(FormatAlign::Center)
                    .set_align(FormatAlign::VerticalCenter),
                subtitle: Format::new()
                    .set_italic()
                    .set_font_size(10)
                    .set_font_color(Color::RGB(0x666666))
                    .set_align(FormatAlign::Center),
                header: cell
                    .clone()
                    .set_bold()
                    .set_font_size(11)
                    .set_font_color(Color::White)
                    .set_background_color(Color::RGB(BRAND))
                    .set_text_wrap(),
                text: cell.clone(),
                count: cell.set_num_format("0"),
                good: pct.clone().set_background_color(Color::RGB(GOOD_FILL)),
                caution: pct.clone().set_background_color(Color::RGB(CAUTION_FILL)),
                risk: pct.set_background_color(Color::RGB(RISK_FILL)),
                notice: Format::new()
                    .set_bold()
                    .set_font_size(14)
                    .set_font_color(Color::RGB(0x00AA00)),
            }
        }

        fn for_cell(&self, kind: ColumnKind, value: &CellValue) -> &Format {
            match (kind, value) {
                (ColumnKind::Percentage, CellValue::Percent(v)) => {
                    match band(*v, BandThresholds::EXPORT) {
                        StatusBand::Good => &self.good,
                        StatusBand::Borderline => &self.caution,
                        StatusBand::Poor => &self.risk,
                    }
                }
                (ColumnKind::Numeric, _) => &self.count,
                _ => &self.text,
            }
        }
    }

    /// Two sheets: every row with batches, and the critical subset (or a
    /// notice when there is none).
    pub fn export_workbook(
        full: &[StudyRecord],
        critical: &[StudyRecord],
        generated_at: NaiveDateTime,
    ) -> Result<Vec<u8>, ExportError> {
        let formats = Formats::new();
        let stamp = generated_at.format("%d/%m/%Y %H:%M");
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name(FULL_VIEW_SHEET)?;
        write_table(
            sheet,
            &formats,
            "Full View of All Studies",
            &format!(
                "Generated {stamp} | {} records | Analytical pipeline and approval status",
                full.len()
            ),
            &FULL_VIEW_COLUMNS,
            full,
        )?;

        let sheet = workbook.add_worksheet();
        sheet.set_name(CRITICAL_SHEET)?;
        sheet.set_tab_color(Color::RGB(CRITICAL_TAB));
        if critical.is_empty() {
            sheet.write_string_with_format(
                0,
                0,
                "No critical studies found for the current filters.",
                &formats.notice,
            )?;
        } else {
            write_table(
                sheet,
                &formats,
                "Studies Requiring Attention",
                &format!(
                    "Generated {stamp} | {} critical studies | Approval < 70% or Completeness < 80%",
                    critical.len()
                ),
                &CRITICAL_VIEW_COLUMNS,
                critical,
            )?;
        }

        let bytes = workbook.save_to_buffer()?;
        tracing::debug!(
            bytes = bytes.len(),
            full = full.len(),
            critical = critical.len(),
            "workbook rendered"
        );
        Ok(bytes)
    }

    fn write_table(
        sheet: &mut Worksheet,
        formats: &Formats,
        title: &str,
        subtitle: &str,
        columns: &[ExportColumn],
        rows: &[StudyRecord],
    ) -> Result<(), ExportError> {
        let last_col = columns.len().saturating_sub(1) as u16;
        write_banner(sheet, TITLE_ROW, last_col, title, &formats.title)?;
        write_banner(sheet, SUBTITLE_ROW, last_col, subtitle, &formats.subtitle)?;

        for (col_idx, column) in columns.iter().enumerate() {
            sheet.write_string_with_format(HEADER_ROW, col_idx as u16, column.label(), &formats.header)?;
        }

        for (row_idx, record) in rows.iter().enumerate() {
            let row = FIRST_DATA_ROW + row_idx as u32;
            for (col_idx, column) in columns.iter().enumerate() {
                let col = col_idx as u16;
                let value = column.value(record);
                let format = formats.for_cell(column.kind(), &value);
                match value {
                    CellValue::Text(s) => {
                        sheet.write_string_with_format(row, col, &s, format)?;
                    }
                    CellValue::Count(n) => {
                        sheet.write_number_with_format(row, col, n as f64, format)?;
                    }
                    CellValue::Percent(v) => {
                        sheet.write_number_with_format(row, col, v, format)?;
                    }
                }
            }
        }

        for (col_idx, width) in column_widths(columns, rows).into_iter().enumerate() {
            sheet.set_column_width(col_idx as u16, width as f64)?;
        }
        sheet.set_freeze_panes(FIRST_DATA_ROW, 0)?;
        Ok(())
    }

    fn write_banner(
        sheet: &mut Worksheet,
        row: u32,
        last_col: u16,
        text: &str,
        format: &Format,
    ) -> Result<(), ExportError> {
        // A one-column merge is rejected by the writer.
        if last_col == 0 {
            sheet.write_string_with_format(row, 0, text, format)?;
        } else {
            sheet.merge_range(row, 0, row, last_col, text, format)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/xlsx.rs"]
mod tests;
