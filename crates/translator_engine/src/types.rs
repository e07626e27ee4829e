use std::time::Duration;

use thiserror::Error;
use translator_core::{BatchIndex, ModelKind};

/// Failure to reach the inference service. Fatal to the current step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("invalid service address {address}: {message}")]
    InvalidAddress { address: String, message: String },
    #[error("timed out after {0:?} connecting to the inference service")]
    Timeout(Duration),
    #[error("inference service unreachable: {0}")]
    Unreachable(String),
    #[error("inference service unhealthy (status {0})")]
    Unhealthy(u16),
}

/// A model-load or chat call that the service rejected or that broke mid-stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteCallError {
    #[error("remote call failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("remote call timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("connection already closed")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Remote(#[from] RemoteCallError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    ModelLoading { model: ModelKind },
    Intent { index: BatchIndex, total: usize },
    /// Completed batches plus the partial reply of the running one.
    Partial { index: BatchIndex, preview: String },
    BatchDone { index: BatchIndex, text: String },
}

pub trait StepSink: Send + Sync {
    fn emit(&self, event: StepEvent);
}

/// Sink for callers that only care about the final session.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StepSink for NullSink {
    fn emit(&self, _event: StepEvent) {}
}
