use crate::{BatchIndex, JobSpec, ModelKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for a new job (translation text or vision prompt).
    Submitted(JobSpec),
    /// User re-triggered a job that was aborted by a remote failure.
    RetryRequested,
    /// The front end ran again; decide the single next action.
    Invoked,
    /// Outcome of a model-load call issued for a `LoadModel` effect.
    ModelLoadFinished {
        model: ModelKind,
        result: Result<(), String>,
    },
    /// Outcome of the streaming call issued for a `TranslateBatch` effect.
    BatchFinished {
        index: BatchIndex,
        result: Result<String, String>,
    },
    /// Drop the job and model state, keeping the size limits.
    Reset,
}
