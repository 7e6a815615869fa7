use csv::WriterBuilder;

use crate::input::record::{DELIMITER, UTF8_BOM};
use crate::model::record::StudyRecord;
use crate::report::ExportError;
use crate::report::columns::ExportColumn;

/// `;`-separated UTF-8 with a BOM, the same framing the source file uses.
pub fn export_delimited_text(
    columns: &[ExportColumn],
    rows: &[StudyRecord],
) -> Result<Vec<u8>, ExportError> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = WriterBuilder::new().delimiter(DELIMITER).from_writer(&mut buf);
        writer.write_record(columns.iter().map(|c| c.label()))?;
        for row in rows {
            writer.write_record(columns.iter().map(|c| c.value(row).render()))?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/delimited.rs"]
mod tests;
