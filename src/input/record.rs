use csv::{ReaderBuilder, StringRecord, Trim};

use crate::input::InputError;
use crate::model::record::{RawRecord, StageCompletion};

pub const DELIMITER: u8 = b';';
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Study,
    Company,
    CompanyLabel,
    FileRef,
    Description,
    Total,
    Approved,
    Rejected,
    Reanalysis,
    Retest,
    ApprovedPct,
    RejectedPct,
    Aliquoting,
    Spiking,
    Extraction,
    Injection,
    RawData,
    Completeness,
    LastUpdate,
}

const FIELDS: [Field; 19] = [
    Field::Study,
    Field::Company,
    Field::CompanyLabel,
    Field::FileRef,
    Field::Description,
    Field::Total,
    Field::Approved,
    Field::Rejected,
    Field::Reanalysis,
    Field::Retest,
    Field::ApprovedPct,
    Field::RejectedPct,
    Field::Aliquoting,
    Field::Spiking,
    Field::Extraction,
    Field::Injection,
    Field::RawData,
    Field::Completeness,
    Field::LastUpdate,
];

impl Field {
    fn name(self) -> &'static str {
        self.aliases()[0]
    }

    // Source header first, then the labels written by the delimited export.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Study => &["ESTUDO", "Study"],
            Field::Company => &["EMPRESA"],
            // Exports carry the display name, which must not be derived again.
            Field::CompanyLabel => &["Company"],
            Field::FileRef => &["ARQUIVO", "File"],
            Field::Description => &["DESCRICAO", "NOME", "Description"],
            Field::Total => &["TOTAL_LOTES", "Total Batches"],
            Field::Approved => &["APROVADOS", "Approved"],
            Field::Rejected => &["REPROVADOS", "Rejected"],
            Field::Reanalysis => &["REAN", "Reanalysis"],
            Field::Retest => &["REPREAN", "Retest"],
            Field::ApprovedPct => &["%_APROVADOS", "% Approved"],
            Field::RejectedPct => &["%_REPROVADOS", "% Rejected"],
            Field::Aliquoting => &["%_ALIQUOTAGEM", "% Aliquoting"],
            Field::Spiking => &["%_DOPAGEM", "% Spiking"],
            Field::Extraction => &["%_EXTRACAO", "% Extraction"],
            Field::Injection => &["%_INJECAO", "% Injection"],
            Field::RawData => &["%_BRUTOS", "% Raw Data"],
            Field::Completeness => &["%_COMPLETUDE", "% Completeness"],
            Field::LastUpdate => &["ULTIMA_ATUALIZACAO", "Last Update"],
        }
    }

    fn required(self) -> bool {
        matches!(
            self,
            Field::Study
                | Field::Company
                | Field::Total
                | Field::Approved
                | Field::Rejected
                | Field::ApprovedPct
                | Field::Completeness
        )
    }
}

#[derive(Debug, Clone)]
struct ColumnMap {
    index: [Option<usize>; FIELDS.len()],
}

impl ColumnMap {
    fn from_header(header: &StringRecord) -> Result<Self, InputError> {
        let mut index = [None; FIELDS.len()];
        for (slot, field) in FIELDS.iter().enumerate() {
            index[slot] = header.iter().position(|name| {
                field
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name.trim()))
            });
        }
        let columns = Self { index };
        for field in FIELDS {
            let present = match field {
                Field::Company => columns.has(field) || columns.has(Field::CompanyLabel),
                _ => columns.has(field),
            };
            if field.required() && !present {
                return Err(InputError::MissingColumn(field.name()));
            }
        }
        Ok(columns)
    }

    fn slot(field: Field) -> Option<usize> {
        FIELDS.iter().position(|f| *f == field)
    }

    fn has(&self, field: Field) -> bool {
        Self::slot(field).is_some_and(|slot| self.index[slot].is_some())
    }

    fn get<'r>(&self, row: &'r StringRecord, field: Field) -> Option<&'r str> {
        let idx = self.index[Self::slot(field)?]?;
        row.get(idx).map(str::trim)
    }

    fn text(&self, row: &StringRecord, field: Field) -> Option<String> {
        self.get(row, field)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn count(&self, row: &StringRecord, field: Field) -> Result<u64, String> {
        match self.get(row, field) {
            None if !field.required() => Ok(0),
            None => Err(format!("{} is missing", field.name())),
            Some(v) => parse_count(v).ok_or_else(|| format!("{} is not a count: {v:?}", field.name())),
        }
    }

    fn percent(&self, row: &StringRecord, field: Field) -> Result<f64, String> {
        match self.get(row, field) {
            None if !field.required() => Ok(0.0),
            None => Err(format!("{} is missing", field.name())),
            Some(v) => {
                parse_percent(v).ok_or_else(|| format!("{} is not a number: {v:?}", field.name()))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<RawRecord>,
    pub skipped_rows: usize,
}

/// Parses `;`-separated rows into records. Header problems fail the whole
/// input; a row with unusable numbers is skipped and counted.
pub fn parse_records(bytes: &[u8]) -> Result<ParseOutcome, InputError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let header = reader.headers()?.clone();
    let columns = ColumnMap::from_header(&header)?;

    let mut outcome = ParseOutcome::default();
    let mut row = StringRecord::new();
    let mut line_no = 1usize;
    loop {
        match reader.read_record(&mut row) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) => {
                line_no += 1;
                tracing::warn!(line = line_no, "unreadable row skipped: {err}");
                outcome.skipped_rows += 1;
                continue;
            }
        }
        line_no += 1;
        if row.iter().all(str::is_empty) {
            continue;
        }
        match parse_row(&columns, &row) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                tracing::warn!(line = line_no, "row skipped: {reason}");
                outcome.skipped_rows += 1;
            }
        }
    }

    tracing::debug!(
        rows = outcome.records.len(),
        skipped = outcome.skipped_rows,
        "parsed delimited input"
    );
    Ok(outcome)
}

fn parse_row(columns: &ColumnMap, row: &StringRecord) -> Result<RawRecord, String> {
    Ok(RawRecord {
        study_code: columns.text(row, Field::Study),
        company_code: columns.text(row, Field::Company),
        company_label: columns.text(row, Field::CompanyLabel),
        file_ref: columns.text(row, Field::FileRef).unwrap_or_default(),
        description: columns.text(row, Field::Description),
        total_batches: columns.count(row, Field::Total)?,
        approved: columns.count(row, Field::Approved)?,
        rejected: columns.count(row, Field::Rejected)?,
        reanalysis: columns.count(row, Field::Reanalysis)?,
        retest: columns.count(row, Field::Retest)?,
        approved_pct: columns.percent(row, Field::ApprovedPct)?,
        rejected_pct: columns.percent(row, Field::RejectedPct)?,
        stages: StageCompletion {
            aliquoting: columns.percent(row, Field::Aliquoting)?,
            spiking: columns.percent(row, Field::Spiking)?,
            extraction: columns.percent(row, Field::Extraction)?,
            injection: columns.percent(row, Field::Injection)?,
            raw_data: columns.percent(row, Field::RawData)?,
        },
        completeness_pct: columns.percent(row, Field::Completeness)?,
        last_update_raw: columns.text(row, Field::LastUpdate),
    })
}

/// Counts may arrive as `12` or `12.0` depending on the exporter.
pub fn parse_count(value: &str) -> Option<u64> {
    if let Ok(v) = value.parse::<u64>() {
        return Some(v);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

pub fn parse_percent(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
