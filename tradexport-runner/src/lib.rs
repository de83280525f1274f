//! Tradexport Runner — pipeline orchestration on top of `tradexport-core`.
//!
//! - `Pipeline` state machine: list symbols, import, convert, export
//! - Progress sinks (channel, closure, tracing, in-memory)
//! - Background worker with a cancel flag
//! - Output path resolution and the TOML config file

pub mod config;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod worker;

pub use config::{ConfigError, ExportConfig, ExportSection};
pub use output::{resolve_output_path, resolve_with_extension};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome, PipelineSettings, PipelineState};
pub use progress::{CollectingSink, ProgressSink, TracingSink};
pub use worker::{spawn_job, spawn_pipeline, Job, PipelineHandle};
