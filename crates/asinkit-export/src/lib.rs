//! File writers for reconciliation output.
//!
//! Row tables go to CSV or XLSX, raw API responses to pretty-printed JSON.
//! Nothing here knows about families; callers hand over rows.

mod error;
pub mod naming;
pub mod table;
pub mod variants;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

pub use error::ExportError;
pub use naming::output_file_name;
pub use table::{write_table, write_workbook, Sheet, TableFormat};
pub use variants::variant_rows;

/// Pretty-prints `value` as JSON to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be created or flushed, or
/// [`ExportError::Json`] if serialization fails.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    tracing::debug!(path = %path.display(), "json written");
    Ok(())
}
