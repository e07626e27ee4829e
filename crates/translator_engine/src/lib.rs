//! Translator engine: stream decoding, the inference-service seam and the step driver.
mod connection;
mod decode;
mod fragments;
mod http;
mod ping;
mod service;
mod settings;
mod step;
mod store;
mod types;

pub use connection::ScopedConnection;
pub use decode::{drain_fragments, DecodeError, FrameDecoder};
pub use fragments::Utf8Assembler;
pub use http::HttpConnector;
pub use ping::{ping, ping_report};
pub use service::{
    ChatRequest, FragmentStream, InferenceConnection, InferenceConnector, LoadModelRequest,
};
pub use settings::{EngineSettings, ModelSettings, PromptSettings, ServiceSettings};
pub use step::{advance_step, StepAction, StepReport};
pub use store::{SessionStore, StoreError};
pub use types::{ConnectionError, NullSink, RemoteCallError, StepError, StepEvent, StepSink};
