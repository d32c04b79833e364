use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sheet '{sheet}' does not fit in a worksheet ({rows} rows x {cols} columns)")]
    SheetTooLarge {
        sheet: String,
        rows: usize,
        cols: usize,
    },

    #[error("unknown table format '{0}' (expected csv or xlsx)")]
    UnknownFormat(String),
}
