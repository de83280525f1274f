//! Delimited-file import shared by importers that accept offline files.

use super::ImportError;
use crate::format::{Field, Format, Record, Value};
use std::fs::File;
use std::path::Path;

/// Read `path` (comma-delimited, header row first) into records of `format`.
///
/// Each field in `headers` is located by its header label; other columns are
/// ignored. A column missing from the file is an error only for the format's
/// required fields; optional ones are then left unset. Empty cells leave the
/// field unset.
pub fn read_delimited(
    format: Format,
    headers: &[Field],
    path: &Path,
) -> Result<Vec<Record>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let file_header = reader.headers().map_err(|e| csv_error(path, 1, e))?.clone();

    let required = format.required_fields();
    let mut columns = Vec::with_capacity(headers.len());
    for &field in headers {
        match file_header.iter().position(|h| h == field.header()) {
            Some(idx) => columns.push((field, idx)),
            None if required.contains(&field) => {
                return Err(ImportError::MissingColumn {
                    path: path.to_path_buf(),
                    column: field.header().to_string(),
                })
            }
            None => tracing::debug!(column = field.header(), "optional column absent"),
        }
    }

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        // Row 1 is the header.
        let row_no = i + 2;
        let row = row.map_err(|e| csv_error(path, row_no, e))?;
        let mut builder = Record::builder(format);
        for &(field, idx) in &columns {
            let cell = row.get(idx).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            let value = Value::parse(field.kind(), cell).map_err(|cause| ImportError::Row {
                path: path.to_path_buf(),
                row: row_no,
                cause: format!("{}: {cause}", field.header()),
            })?;
            builder.insert(field, value);
        }
        let record = builder.build().map_err(|e| ImportError::Row {
            path: path.to_path_buf(),
            row: row_no,
            cause: e.to_string(),
        })?;
        records.push(record);
    }

    tracing::debug!(path = %path.display(), rows = records.len(), "read delimited file");
    Ok(records)
}

fn csv_error(path: &Path, row: usize, e: csv::Error) -> ImportError {
    if e.is_io_error() {
        if let csv::ErrorKind::Io(source) = e.into_kind() {
            return ImportError::File {
                path: path.to_path_buf(),
                source,
            };
        }
        return ImportError::Row {
            path: path.to_path_buf(),
            row,
            cause: "I/O error".into(),
        };
    }
    ImportError::Row {
        path: path.to_path_buf(),
        row,
        cause: e.to_string(),
    }
}
