//! `Importer` implementation over the KuCoin fills API.
//!
//! The window is resolved to milliseconds, split into spans no longer than
//! the exchange allows per query, and each span is paged until exhausted.
//! Every page request is one chunk fetch; the cancel flag is polled before each.

use super::payload::{open_envelope, EnvelopeError, Fill, FillsPage, SymbolInfo};
use super::transport::{HttpTransport, KuCoinTransport};
use super::{KuCoinOptions, FILLS_PATH, SYMBOLS_PATH};
use crate::cancel::CancelFlag;
use crate::credentials::Credentials;
use crate::format::{Field, Format, Record};
use crate::importer::{file, ImportError, Importer, TransportError};
use crate::window::{split_span, ChunkWindow, MILLIS_PER_DAY};
use chrono::{DateTime, Utc};
use std::path::Path;

pub struct KuCoinImporter<T: KuCoinTransport = HttpTransport> {
    transport: T,
    options: KuCoinOptions,
    fixed_now: Option<DateTime<Utc>>,
}

impl KuCoinImporter<HttpTransport> {
    /// Importer talking to the real API.
    pub fn http(options: KuCoinOptions) -> Result<Self, ImportError> {
        let transport = HttpTransport::new(&options)?;
        Ok(Self::new(transport, options))
    }
}

impl<T: KuCoinTransport> KuCoinImporter<T> {
    pub fn new(transport: T, options: KuCoinOptions) -> Self {
        Self {
            transport,
            options,
            fixed_now: None,
        }
    }

    /// Pin "now" so open-ended windows resolve deterministically.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Fetch every page of one span, returned oldest first.
    fn fetch_span(
        &self,
        credentials: &Credentials,
        symbol: &str,
        (start, end): (i64, i64),
        cancel: &CancelFlag,
    ) -> Result<Vec<Fill>, ImportError> {
        let page_size = self.options.page_size.max(1);
        let mut fills = Vec::new();
        let mut page = 1u32;

        loop {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }

            let query = [
                ("symbol", symbol.to_string()),
                ("startAt", start.to_string()),
                // endAt is inclusive on the API side.
                ("endAt", (end - 1).to_string()),
                ("tradeType", "TRADE".to_string()),
                ("currentPage", page.to_string()),
                ("pageSize", page_size.to_string()),
            ];
            let body = self.transport.get(Some(credentials), FILLS_PATH, &query)?;
            let batch: FillsPage = open_envelope(&body).map_err(|e| match e {
                EnvelopeError::Rejected { code, msg } => {
                    ImportError::Transport(TransportError::Api { code, msg })
                }
                EnvelopeError::Malformed(cause) => ImportError::Payload {
                    symbol: symbol.to_string(),
                    cause,
                },
            })?;

            tracing::debug!(
                symbol,
                start,
                end,
                page = batch.current_page,
                total_pages = batch.total_page,
                items = batch.items.len(),
                "fetched fills page"
            );

            let exhausted = batch.items.is_empty() || batch.current_page >= batch.total_page;
            fills.extend(batch.items);
            if exhausted {
                break;
            }
            page = batch.current_page + 1;
        }

        // The API pages newest first.
        fills.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.trade_id.cmp(&b.trade_id))
        });
        Ok(fills)
    }
}

impl<T: KuCoinTransport> Importer for KuCoinImporter<T> {
    fn format(&self) -> Format {
        Format::KuCoin
    }

    fn list_symbols(&self, _credentials: &Credentials) -> Result<Vec<String>, ImportError> {
        let body = self.transport.get(None, SYMBOLS_PATH, &[])?;
        let symbols: Vec<SymbolInfo> = open_envelope(&body).map_err(|e| match e {
            EnvelopeError::Rejected { code, msg } => {
                ImportError::Transport(TransportError::Api { code, msg })
            }
            EnvelopeError::Malformed(cause) => ImportError::SymbolList(cause),
        })?;
        Ok(symbols
            .into_iter()
            .filter(|s| s.enable_trading)
            .map(|s| s.symbol)
            .collect())
    }

    fn import_chunks(
        &self,
        credentials: &Credentials,
        symbol: &str,
        window: ChunkWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Record>, ImportError> {
        let Some((start, end)) = window.millis_range(self.now(), self.options.lookback_days)
        else {
            tracing::debug!(symbol, ?window, "window selects nothing");
            return Ok(Vec::new());
        };

        let max_span = self.options.max_span_days.max(1).saturating_mul(MILLIS_PER_DAY);
        let mut records = Vec::new();
        for span in split_span(start, end, max_span) {
            for fill in self.fetch_span(credentials, symbol, span, cancel)? {
                let record = fill.to_record().map_err(|cause| ImportError::Payload {
                    symbol: symbol.to_string(),
                    cause,
                })?;
                records.push(record);
            }
        }
        Ok(records)
    }

    fn import_file(&self, headers: &[Field], path: &Path) -> Result<Vec<Record>, ImportError> {
        file::read_delimited(Format::KuCoin, headers, path)
    }
}
