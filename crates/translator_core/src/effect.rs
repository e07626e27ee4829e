use crate::{BatchIndex, JobKind, ModelKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Connect and ask the service to load `model`.
    LoadModel { model: ModelKind },
    /// Surface the "about to translate" indicator; no work is done this invocation.
    ShowIntent { index: BatchIndex },
    /// Connect and run the streaming call for one batch.
    TranslateBatch {
        index: BatchIndex,
        input: String,
        kind: JobKind,
    },
    /// Every batch of the active job has been produced.
    Finished,
    /// User-visible message.
    Notify(String),
    /// The front end should run again to make further progress.
    RequestRerun,
}
