use crate::{BatchIndex, ModelKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    LoadingModel(ModelKind),
    Translating { index: BatchIndex, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub model_loaded: bool,
    pub model_loading: bool,
    pub translating: bool,
    pub current_batch: Option<BatchIndex>,
    pub batch_count: usize,
    pub completed_batches: usize,
    pub streaming_text: String,
    pub indicator: Option<Indicator>,
    pub last_error: Option<String>,
    pub notice: Option<String>,
}
