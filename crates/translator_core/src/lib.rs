//! Translator core: batch splitting and the pure translation step machine.
mod effect;
mod msg;
mod settings;
mod split;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use settings::{
    ConfigError, StepSettings, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_CONTENT_LENGTH,
};
pub use split::{split_batches, truncate_content};
pub use state::{BatchIndex, Framing, Job, JobKind, JobSpec, ModelKind, Session};
pub use update::update;
pub use view_model::{Indicator, SessionView};
