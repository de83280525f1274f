//! Tradexport CLI — KuCoin trade history to CoinTracking CSV.
//!
//! Commands:
//! - `export` — import every traded symbol from the KuCoin API and write a CoinTracking CSV
//! - `convert` — convert a previously saved KuCoin fills CSV offline
//! - `symbols` — list the symbols KuCoin currently trades
//!
//! Progress goes to stdout, logs to stderr (`RUST_LOG`, default `info`).
//! Ctrl-C during `export` stops the run at its next checkpoint without
//! writing a file.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tradexport_core::{ChunkWindow, Credentials, Format};
use tradexport_runner::{
    spawn_pipeline, ExportConfig, Pipeline, PipelineError, PipelineSettings, ProgressSink,
};

#[derive(Parser)]
#[command(
    name = "tradexport",
    version,
    about = "Export KuCoin trade history as a CoinTracking CSV"
)]
struct Cli {
    /// TOML config file with [kucoin] and [export] tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import all trades through the KuCoin API and export them.
    Export {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// First day to include (YYYY-MM-DD).
        #[arg(long)]
        since: Option<NaiveDate>,

        /// First day to exclude (YYYY-MM-DD).
        #[arg(long)]
        before: Option<NaiveDate>,

        /// Output file or directory. Defaults to ./records.csv.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Convert a KuCoin fills CSV (camelCase API column names) without network access.
    Convert {
        /// Input CSV.
        input: PathBuf,

        /// Output file or directory. Defaults to ./records.csv.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List tradable KuCoin symbols.
    Symbols,
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long, env = "KUCOIN_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "KUCOIN_API_SECRET", hide_env_values = true)]
    api_secret: String,

    #[arg(long, env = "KUCOIN_API_PASSPHRASE", hide_env_values = true)]
    api_passphrase: String,
}

impl CredentialArgs {
    fn into_credentials(self) -> Result<Credentials> {
        let creds = Credentials::new(self.api_key, self.api_secret, self.api_passphrase);
        if creds.is_empty() || creds.api_passphrase.is_empty() {
            bail!("KuCoin API key, secret and passphrase must all be non-empty");
        }
        Ok(creds)
    }
}

/// Prints each progress line on its own stdout line.
struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn report(&self, message: &str) {
        println!("{message}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    match cli.command {
        Commands::Export {
            credentials,
            since,
            before,
            output,
        } => run_export(config, credentials.into_credentials()?, since, before, output),
        Commands::Convert { input, output } => run_convert(config, &input, output),
        Commands::Symbols => run_symbols(config),
    }
}

fn run_export(
    mut config: ExportConfig,
    credentials: Credentials,
    since: Option<NaiveDate>,
    before: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<()> {
    // Flags win over the config file.
    if since.is_some() {
        config.export.since = since;
    }
    if before.is_some() {
        config.export.before = before;
    }
    if output.is_some() {
        config.export.output = output;
    }

    let window: ChunkWindow = config.window();
    let settings = PipelineSettings::new(credentials)
        .with_window(window)
        .with_output(config.export.output.clone());
    let pipeline = Pipeline::kucoin(config.kucoin)?;

    let handle = spawn_pipeline(pipeline, settings).context("failed to start export worker")?;
    let flag = handle.cancel_flag();
    ctrlc::set_handler(move || {
        tracing::info!("interrupt received, cancelling");
        flag.cancel();
    })
    .context("failed to install Ctrl-C handler")?;
    for line in handle.progress().iter() {
        StdoutProgress.report(&line);
    }
    let (result, _) = handle.join();
    finish(result)
}

fn run_convert(config: ExportConfig, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let settings = PipelineSettings::new(Credentials::default())
        .with_output(output.or(config.export.output));
    let pipeline = Pipeline::kucoin(config.kucoin)?;
    let result = pipeline.run_file(
        input,
        &Format::KuCoin.fields(),
        &settings,
        &StdoutProgress,
        &Default::default(),
    );
    finish(result)
}

fn run_symbols(config: ExportConfig) -> Result<()> {
    let pipeline = Pipeline::kucoin(config.kucoin)?;
    let symbols = pipeline.importer().list_symbols(&Credentials::default())?;
    for symbol in &symbols {
        println!("{symbol}");
    }
    tracing::info!(count = symbols.len(), "listed symbols");
    Ok(())
}

fn finish(result: Result<tradexport_runner::PipelineOutcome, PipelineError>) -> Result<()> {
    match result {
        Ok(outcome) => {
            tracing::info!(records = outcome.records, path = %outcome.path.display(), "done");
            Ok(())
        }
        Err(PipelineError::Cancelled) => {
            println!("Export cancelled, nothing was written");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
