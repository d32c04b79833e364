//! CSV and XLSX writers for row tables.
//!
//! A table is `&[Vec<String>]` with the header first. Rows may differ in
//! width; every cell is written as text.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::ExportError;

// Excel's hard worksheet limits.
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLS: usize = 16_384;

/// Sheet name used when a single table is written to XLSX.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    #[default]
    Csv,
    Xlsx,
}

impl TableFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TableFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(ExportError::UnknownFormat(other.to_owned())),
        }
    }
}

/// A named table destined for one worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Writes `rows` to `path` in the given format.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or a cell cannot be
/// written.
pub fn write_table(rows: &[Vec<String>], format: TableFormat, path: &Path) -> Result<(), ExportError> {
    match format {
        TableFormat::Csv => write_csv(rows, path),
        TableFormat::Xlsx => {
            let mut workbook = Workbook::new();
            add_sheet(&mut workbook, DEFAULT_SHEET_NAME, rows)?;
            workbook.save(path)?;
            Ok(())
        }
    }?;
    tracing::debug!(path = %path.display(), %format, rows = rows.len(), "table written");
    Ok(())
}

/// Writes several named sheets into one XLSX workbook.
///
/// # Errors
///
/// Returns [`ExportError`] if a sheet name is rejected (empty, over 31
/// characters, duplicated) or the workbook cannot be saved.
pub fn write_workbook(sheets: &[Sheet], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        add_sheet(&mut workbook, &sheet.name, &sheet.rows)?;
    }
    workbook.save(path)?;
    tracing::debug!(path = %path.display(), sheets = sheets.len(), "workbook written");
    Ok(())
}

fn write_csv(rows: &[Vec<String>], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        // The csv crate renders a zero-field record as `""`; skip it instead.
        if row.is_empty() {
            continue;
        }
        writer.write_record(row)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn add_sheet(workbook: &mut Workbook, name: &str, rows: &[Vec<String>]) -> Result<(), ExportError> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.len() > XLSX_MAX_ROWS || width > XLSX_MAX_COLS {
        return Err(ExportError::SheetTooLarge {
            sheet: name.to_owned(),
            rows: rows.len(),
            cols: width,
        });
    }

    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            write_cell(worksheet, r, c, value, (r == 0).then_some(&header_format))?;
        }
    }
    if !rows.is_empty() {
        worksheet.set_freeze_panes(1, 0)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &str,
    format: Option<&Format>,
) -> Result<(), ExportError> {
    // Bounds were checked against the XLSX limits in `add_sheet`.
    let (Ok(row), Ok(col)) = (u32::try_from(row), u16::try_from(col)) else {
        return Err(ExportError::SheetTooLarge {
            sheet: worksheet.name(),
            rows: row,
            cols: col,
        });
    };
    match format {
        Some(format) => worksheet.write_string_with_format(row, col, value, format)?,
        None => worksheet.write_string(row, col, value)?,
    };
    Ok(())
}
