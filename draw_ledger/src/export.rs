//! Serialization of winners to CSV and XLSX bytes, and the file names that go
//! with them.

use log::debug;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use snafu::prelude::*;

use crate::config::*;
use crate::ledger::Ledger;

/// Title of the leading column in exports built from the ledger.
pub const DRAW_COLUMN: &str = "Draw";
/// Label of the export containing the whole ledger.
pub const ALL_DRAWS_LABEL: &str = "All Draws";
/// File name used when a label has nothing left after sanitization.
pub const FALLBACK_FILE_NAME: &str = "winners";

const SHEET_NAME: &str = "Winners";
const ILLEGAL_FILE_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
// Worksheet limits of the XLSX format.
const MAX_SHEET_ROWS: usize = 1_048_576;
const MAX_SHEET_COLUMNS: usize = 16_384;
// Integers beyond this are not exactly representable as spreadsheet numbers.
const MAX_EXACT_INT: u64 = 1 << 53;

#[derive(Debug, Snafu)]
pub enum ExportError {
    #[snafu(display("Failed to write CSV"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Failed to write XLSX workbook"))]
    XlsxWrite { source: XlsxError },
    #[snafu(display("{rows} rows and {columns} columns do not fit in a worksheet"))]
    SheetTooLarge { rows: usize, columns: usize },
}

/// The two interchangeable output formats.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Spreadsheet sources get spreadsheet results, anything else gets CSV.
    pub fn for_source(source_name: &str) -> ExportFormat {
        let lower = source_name.to_lowercase();
        if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            ExportFormat::Xlsx
        } else {
            ExportFormat::Csv
        }
    }

    pub fn parse(s: &str) -> Option<ExportFormat> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" | "excel" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

struct TableRow<'a> {
    draw: Option<&'a DrawName>,
    row: &'a Row,
}

/// A read-only view of rows to export, with its header.
pub struct Table<'a> {
    header: Vec<String>,
    rows: Vec<TableRow<'a>>,
}

impl<'a> Table<'a> {
    /// The winners of one draw, with the participant columns only.
    pub fn for_draw(schema: &Schema, draw: &'a Draw) -> Table<'a> {
        Table {
            header: schema.columns().to_vec(),
            rows: draw
                .winners
                .iter()
                .map(|row| TableRow { draw: None, row })
                .collect(),
        }
    }

    /// One group of the ledger, prefixed by the draw column.
    pub fn for_group(schema: &Schema, draw: &'a DrawName, rows: &[&'a Row]) -> Table<'a> {
        Table {
            header: with_draw_column(schema),
            rows: rows
                .iter()
                .map(|&row| TableRow {
                    draw: Some(draw),
                    row,
                })
                .collect(),
        }
    }

    /// The whole ledger sorted by draw name, prefixed by the draw column.
    pub fn for_ledger(schema: &Schema, ledger: &'a Ledger) -> Table<'a> {
        Table {
            header: with_draw_column(schema),
            rows: ledger
                .all()
                .into_iter()
                .map(|e| TableRow {
                    draw: Some(&e.draw),
                    row: &e.row,
                })
                .collect(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Xlsx => self.to_xlsx(),
        }
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&self.header).context(CsvWriteSnafu)?;
        for tr in self.rows.iter() {
            let mut record: Vec<String> = Vec::with_capacity(self.header.len());
            if let Some(draw) = tr.draw {
                record.push(draw.as_str().to_string());
            }
            record.extend(tr.row.to_text_record());
            wtr.write_record(&record).context(CsvWriteSnafu)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
            .context(CsvWriteSnafu)?;
        debug!("Table::to_csv: {} rows, {} bytes", self.rows.len(), bytes.len());
        Ok(bytes)
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        ensure!(
            self.rows.len() < MAX_SHEET_ROWS && self.header.len() <= MAX_SHEET_COLUMNS,
            SheetTooLargeSnafu {
                rows: self.rows.len(),
                columns: self.header.len(),
            }
        );
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).context(XlsxWriteSnafu)?;

        for (col, title) in self.header.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, title.as_str(), &bold)
                .context(XlsxWriteSnafu)?;
        }

        for (idx, tr) in self.rows.iter().enumerate() {
            let rownum = (idx + 1) as u32;
            let mut col: u16 = 0;
            if let Some(draw) = tr.draw {
                worksheet
                    .write_string(rownum, col, draw.as_str())
                    .context(XlsxWriteSnafu)?;
                col += 1;
            }
            for v in tr.row.values() {
                match v {
                    Value::Empty => {}
                    Value::Text(s) => {
                        worksheet
                            .write_string(rownum, col, s.as_str())
                            .context(XlsxWriteSnafu)?;
                    }
                    Value::Int(i) if i.unsigned_abs() <= MAX_EXACT_INT => {
                        worksheet
                            .write_number(rownum, col, *i as f64)
                            .context(XlsxWriteSnafu)?;
                    }
                    Value::Int(i) => {
                        worksheet
                            .write_string(rownum, col, i.to_string())
                            .context(XlsxWriteSnafu)?;
                    }
                    Value::Float(f) => {
                        worksheet
                            .write_number(rownum, col, *f)
                            .context(XlsxWriteSnafu)?;
                    }
                    Value::Bool(b) => {
                        worksheet
                            .write_boolean(rownum, col, *b)
                            .context(XlsxWriteSnafu)?;
                    }
                }
                col += 1;
            }
        }

        let bytes = workbook.save_to_buffer().context(XlsxWriteSnafu)?;
        debug!("Table::to_xlsx: {} rows, {} bytes", self.rows.len(), bytes.len());
        Ok(bytes)
    }
}

fn with_draw_column(schema: &Schema) -> Vec<String> {
    let mut header = vec![DRAW_COLUMN.to_string()];
    header.extend(schema.columns().iter().cloned());
    header
}

/// Turns a label into something usable as a file name on common filesystems.
pub fn sanitize_file_name(label: &str) -> String {
    let replaced: String = label
        .chars()
        .map(|c| {
            if ILLEGAL_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn file_name(label: &str, format: ExportFormat) -> String {
    format!("{}.{}", sanitize_file_name(label), format.extension())
}

/// The name of the latest draw's result file: `<source stem>_result.<ext>`.
pub fn result_file_name(source_name: &str, format: ExportFormat) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => source_name,
    };
    format!(
        "{}_result.{}",
        sanitize_file_name(stem),
        format.extension()
    )
}
