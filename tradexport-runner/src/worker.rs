//! Background worker — runs one pipeline off the caller's thread.
//!
//! The caller keeps the progress receiver and the cancel flag; the worker
//! owns the pipeline and its settings for the duration of the run.

use crate::pipeline::{Pipeline, PipelineError, PipelineOutcome, PipelineSettings};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tradexport_core::{CancelFlag, Field};

/// Which import path the worker takes.
#[derive(Debug, Clone)]
pub enum Job {
    /// Every tradable symbol through the remote API.
    Api,
    /// A previously exported file.
    File { input: PathBuf, headers: Vec<Field> },
}

/// A running pipeline.
pub struct PipelineHandle {
    progress: Receiver<String>,
    cancel: CancelFlag,
    thread: JoinHandle<Result<PipelineOutcome, PipelineError>>,
}

impl PipelineHandle {
    /// Progress lines in emission order. Disconnects when the run ends.
    pub fn progress(&self) -> &Receiver<String> {
        &self.progress
    }

    /// Ask the run to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle on the same flag, for signal handlers and other threads.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Wait for the run. Lines still queued stay readable from the receiver
    /// returned alongside the result.
    pub fn join(self) -> (Result<PipelineOutcome, PipelineError>, Receiver<String>) {
        let result = self
            .thread
            .join()
            .unwrap_or(Err(PipelineError::WorkerPanicked));
        (result, self.progress)
    }
}

/// Run the API pipeline on a dedicated thread.
pub fn spawn_pipeline(
    pipeline: Pipeline,
    settings: PipelineSettings,
) -> io::Result<PipelineHandle> {
    spawn_job(pipeline, settings, Job::Api)
}

pub fn spawn_job(
    pipeline: Pipeline,
    settings: PipelineSettings,
    job: Job,
) -> io::Result<PipelineHandle> {
    let (tx, rx) = mpsc::channel::<String>();
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();

    let thread = thread::Builder::new()
        .name("tradexport-worker".into())
        .spawn(move || {
            tracing::debug!(?job, "worker started");
            match job {
                Job::Api => pipeline.run(&settings, &tx, &worker_cancel),
                Job::File { input, headers } => {
                    pipeline.run_file(&input, &headers, &settings, &tx, &worker_cancel)
                }
            }
        })?;

    Ok(PipelineHandle {
        progress: rx,
        cancel,
        thread,
    })
}
