//! Pipeline orchestrator — import every symbol, convert once, export once.
//!
//! ```text
//! Idle → ListingSymbols → ImportingSymbol(i)… → Converting → Exporting → Done
//! ```
//!
//! `Cancelled` and `Failed` are terminal and reachable from any non-terminal
//! state. The cancel flag is checked before every transition up to and
//! including `Exporting`; once the export has started the run completes.
//! Nothing is written unless every earlier stage succeeded.

use crate::output::resolve_with_extension;
use crate::progress::ProgressSink;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradexport_core::importer::{KuCoinImporter, KuCoinOptions};
use tradexport_core::{
    CancelFlag, ChunkWindow, ConvertError, Converter, Credentials, CsvExporter, ExportError,
    Exporter, Field, Format, ImportError, Importer, Record, TransportError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ListingSymbols,
    /// Index into the symbol list.
    ImportingSymbol(usize),
    Converting,
    Exporting,
    Done,
    Cancelled,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineState::Done | PipelineState::Cancelled | PipelineState::Failed
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::ImportingSymbol(i) => write!(f, "ImportingSymbol({i})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Transport(TransportError),

    #[error(transparent)]
    Import(ImportError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("export cancelled")]
    Cancelled,

    #[error("pipeline worker panicked")]
    WorkerPanicked,
}

impl PipelineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}

impl From<TransportError> for PipelineError {
    fn from(e: TransportError) -> Self {
        PipelineError::Transport(e)
    }
}

/// Transport failures and cancellation get their own variants; everything
/// else an importer reports stays an `Import` error.
impl From<ImportError> for PipelineError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Transport(t) => PipelineError::Transport(t),
            ImportError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Import(other),
        }
    }
}

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub credentials: Credentials,
    pub window: ChunkWindow,
    /// Requested location; resolved against the exporter's extension.
    pub output: Option<PathBuf>,
    pub source: Format,
    pub destination: Format,
    /// Export column order.
    pub headers: Vec<Field>,
}

impl PipelineSettings {
    /// KuCoin → CoinTracking over an unbounded window into `records.csv`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            window: ChunkWindow::UNBOUNDED,
            output: None,
            source: Format::KuCoin,
            destination: Format::CoinTracking,
            headers: Format::CoinTracking.export_header(),
        }
    }

    pub fn with_window(mut self, window: ChunkWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub path: PathBuf,
    pub records: usize,
}

/// State machine bookkeeping for one run.
struct Run<'a> {
    cancel: &'a CancelFlag,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<'a> Run<'a> {
    fn new(cancel: &'a CancelFlag) -> Self {
        Self {
            cancel,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    /// Move to `next` unless cancellation was requested.
    fn advance(&mut self, next: PipelineState) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        self.enter(next);
        Ok(())
    }

    fn enter(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.history.push(next);
    }

    fn finish<T>(&mut self, result: &Result<T, PipelineError>) {
        match result {
            Ok(_) => self.enter(PipelineState::Done),
            Err(PipelineError::Cancelled) => {
                tracing::info!(at = %self.state, "pipeline cancelled");
                self.enter(PipelineState::Cancelled);
            }
            Err(e) => {
                tracing::warn!(at = %self.state, error = %e, "pipeline failed");
                self.enter(PipelineState::Failed);
            }
        }
    }
}

/// Importer → converter → exporter.
pub struct Pipeline {
    importer: Box<dyn Importer>,
    converter: Converter,
    exporter: Box<dyn Exporter>,
}

impl Pipeline {
    pub fn new(
        importer: Box<dyn Importer>,
        converter: Converter,
        exporter: Box<dyn Exporter>,
    ) -> Self {
        Self {
            importer,
            converter,
            exporter,
        }
    }

    /// Live KuCoin API → built-in tables → CSV.
    pub fn kucoin(options: KuCoinOptions) -> Result<Self, PipelineError> {
        let importer = KuCoinImporter::http(options)?;
        Ok(Self::new(
            Box::new(importer),
            Converter::new(),
            Box::new(CsvExporter::default()),
        ))
    }

    pub fn importer(&self) -> &dyn Importer {
        self.importer.as_ref()
    }

    /// Import every tradable symbol through the API, convert, export.
    pub fn run(
        &self,
        settings: &PipelineSettings,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.run_tracked(settings, progress, cancel).0
    }

    /// Offline variant: read `input` (columns labelled by `input_headers`)
    /// instead of calling the API.
    pub fn run_file(
        &self,
        input: &Path,
        input_headers: &[Field],
        settings: &PipelineSettings,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut run = Run::new(cancel);
        let result = self.import_file(&mut run, input, input_headers, progress).and_then(
            |records| self.convert_and_export(&mut run, records, settings, progress),
        );
        run.finish(&result);
        result
    }

    fn run_tracked(
        &self,
        settings: &PipelineSettings,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> (Result<PipelineOutcome, PipelineError>, Vec<PipelineState>) {
        let mut run = Run::new(cancel);
        let result = self
            .import_all(&mut run, settings, progress)
            .and_then(|records| self.convert_and_export(&mut run, records, settings, progress));
        run.finish(&result);
        (result, run.history)
    }

    fn import_all(
        &self,
        run: &mut Run<'_>,
        settings: &PipelineSettings,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Record>, PipelineError> {
        progress.report("Importing was started...");
        run.advance(PipelineState::ListingSymbols)?;
        let symbols = self.importer.list_symbols(&settings.credentials)?;
        tracing::info!(symbols = symbols.len(), "listed symbols");

        let mut records = Vec::new();
        for (i, symbol) in symbols.iter().enumerate() {
            run.advance(PipelineState::ImportingSymbol(i))?;
            progress.report(&format!("Importing trades for symbol {symbol}"));
            let chunk =
                self.importer
                    .import_chunks(&settings.credentials, symbol, settings.window, run.cancel)?;
            progress.report(&format!("Imported trades: {}", chunk.len()));
            records.extend(chunk);
        }
        progress.report(&format!("{} records were imported", records.len()));
        Ok(records)
    }

    fn import_file(
        &self,
        run: &mut Run<'_>,
        input: &Path,
        input_headers: &[Field],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Record>, PipelineError> {
        progress.report("Importing was started...");
        run.advance(PipelineState::ImportingSymbol(0))?;
        progress.report(&format!("Importing trades from file {}", input.display()));
        let records = self.importer.import_file(input_headers, input)?;
        progress.report(&format!("{} records were imported", records.len()));
        Ok(records)
    }

    fn convert_and_export(
        &self,
        run: &mut Run<'_>,
        records: Vec<Record>,
        settings: &PipelineSettings,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineOutcome, PipelineError> {
        run.advance(PipelineState::Converting)?;
        progress.report("Starting conversion...");
        let converted = self
            .converter
            .convert(settings.source, settings.destination, &records)?;
        drop(records);

        run.advance(PipelineState::Exporting)?;
        let path = resolve_with_extension(settings.output.as_deref(), self.exporter.extension());
        self.exporter.export(&settings.headers, &converted, &path)?;
        tracing::info!(path = %path.display(), records = converted.len(), "export written");
        progress.report(&format!("Records were saved to path: {}", path.display()));

        Ok(PipelineOutcome {
            path,
            records: converted.len(),
        })
    }
}
