//! Exporters — serialize converted records to a file.

use crate::format::{Field, Record};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    fn io(path: &Path, source: io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A sink for converted records.
pub trait Exporter: Send + Sync {
    /// File extension, without the dot, this exporter writes.
    fn extension(&self) -> &str;

    /// Write one header row labelled in `headers` order, then one row per
    /// record in input order.
    ///
    /// A record lacking a header field gets an empty cell. The destination is
    /// overwritten; on failure it is left as it was.
    fn export(
        &self,
        headers: &[Field],
        records: &[Record],
        path: &Path,
    ) -> Result<(), ExportError>;
}

/// RFC 4180 CSV with an atomic replace of the destination.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvExporter {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Render the full document in memory.
    pub fn render(&self, headers: &[Field], records: &[Record]) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(vec![]);

        wtr.write_record(headers.iter().map(|f| f.header()))?;
        for record in records {
            wtr.write_record(
                headers
                    .iter()
                    .map(|f| record.get(*f).map(|v| v.to_string()).unwrap_or_default()),
            )?;
        }
        wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
    }
}

impl Exporter for CsvExporter {
    fn extension(&self) -> &str {
        "csv"
    }

    fn export(
        &self,
        headers: &[Field],
        records: &[Record],
        path: &Path,
    ) -> Result<(), ExportError> {
        let bytes = self
            .render(headers, records)
            .map_err(|e| ExportError::io(path, io::Error::other(e)))?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ExportError::io(path, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ExportError::io(path, e))?;
        tmp.persist(path).map_err(|e| ExportError::io(path, e.error))?;

        tracing::debug!(
            path = %path.display(),
            rows = records.len(),
            bytes = bytes.len(),
            "wrote csv"
        );
        Ok(())
    }
}
