//! Importer contract and structured import errors.
//!
//! The `Importer` trait abstracts over trade sources (KuCoin today) so the
//! pipeline never depends on a concrete exchange, and tests can substitute
//! scripted sources.

pub mod file;
pub mod kucoin;

pub use kucoin::{HttpTransport, KuCoinImporter, KuCoinOptions, KuCoinTransport};

use crate::cancel::CancelFlag;
use crate::credentials::Credentials;
use crate::format::{Field, Format, Record};
use crate::window::ChunkWindow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The remote call itself failed (network, HTTP status, or the API refused it).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("HTTP {status} from {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("API rejected request (code {code}): {msg}")]
    Api { code: String, msg: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed payload for symbol {symbol}: {cause}")]
    Payload { symbol: String, cause: String },

    #[error("malformed symbol list: {0}")]
    SymbolList(String),

    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("malformed row {row} in {}: {cause}", path.display())]
    Row {
        path: PathBuf,
        row: usize,
        cause: String,
    },

    #[error("import cancelled")]
    Cancelled,
}

/// A trade source for one format.
///
/// Implementations are side-effect free beyond the remote read and
/// deterministic for a given (symbol, window).
pub trait Importer: Send + Sync {
    /// Format every produced record is tagged with.
    fn format(&self) -> Format;

    /// Symbols the account can have traded. Queries the remote API once.
    fn list_symbols(&self, credentials: &Credentials) -> Result<Vec<String>, ImportError>;

    /// Every trade for `symbol` inside `window`, oldest first.
    ///
    /// Chunking and paging are internal; callers see one flattened sequence.
    /// `cancel` is polled between chunk fetches. An empty window yields an
    /// empty sequence without touching the network.
    fn import_chunks(
        &self,
        credentials: &Credentials,
        symbol: &str,
        window: ChunkWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Record>, ImportError>;

    /// Offline path: read previously exported trades from a delimited file.
    fn import_file(&self, headers: &[Field], path: &Path) -> Result<Vec<Record>, ImportError>;
}
