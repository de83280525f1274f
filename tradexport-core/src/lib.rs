//! Tradexport Core — record model, importers, converter, exporters.
//!
//! This crate contains the three stages of a trade export and the data
//! model they share:
//! - Formats, per-format fields and tagged values (`format`)
//! - Chunk windows and the cooperative cancel flag
//! - Importer contract with the KuCoin implementation (API + CSV file)
//! - Converter driven by declarative mapping tables
//! - Exporter contract with the atomic CSV exporter
//!
//! Orchestration lives in `tradexport-runner`.

pub mod cancel;
pub mod convert;
pub mod credentials;
pub mod export;
pub mod format;
pub mod importer;
pub mod window;

pub use cancel::CancelFlag;
pub use convert::{ConvertError, Converter, MappingTable, Rule};
pub use credentials::Credentials;
pub use export::{CsvExporter, ExportError, Exporter};
pub use format::{
    CoinTrackingField, Field, Format, KuCoinField, Record, RecordBuilder, RecordError, Value,
    ValueKind, DATE_FORMAT,
};
pub use importer::{ImportError, Importer, TransportError};
pub use window::ChunkWindow;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a pipeline moves onto its worker
    /// thread is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Record>();
        require_sync::<Record>();
        require_send::<Value>();
        require_sync::<Value>();
        require_send::<Field>();
        require_sync::<Field>();
        require_send::<ChunkWindow>();
        require_sync::<ChunkWindow>();
        require_send::<CancelFlag>();
        require_sync::<CancelFlag>();
        require_send::<Credentials>();
        require_sync::<Credentials>();
        require_send::<Converter>();
        require_sync::<Converter>();
        require_send::<CsvExporter>();
        require_sync::<CsvExporter>();
        require_send::<ImportError>();
        require_send::<ConvertError>();
        require_send::<ExportError>();
    }

    /// The pipeline only ever talks to these contracts as trait objects.
    #[test]
    fn contracts_are_object_safe() {
        fn _importer(_: &dyn Importer) {}
        fn _exporter(_: &dyn Exporter) {}
    }
}
