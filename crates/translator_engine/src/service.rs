use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Serialize;
use translator_core::{JobKind, ModelKind};

use crate::{ConnectionError, ModelSettings, PromptSettings, RemoteCallError};

/// Fragments of one streaming reply, in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, RemoteCallError>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadModelRequest {
    pub model_path: String,
    pub chat_model: String,
    pub embedding_model: Option<String>,
    pub ranker_model: Option<String>,
}

impl LoadModelRequest {
    pub fn for_model(model: ModelKind, settings: &ModelSettings) -> Self {
        match model {
            ModelKind::Language => Self {
                model_path: settings.model_path.clone(),
                chat_model: settings.chat_model.clone(),
                embedding_model: Some(settings.embedding_model.clone()),
                ranker_model: Some(settings.ranker_model.clone()),
            },
            ModelKind::Vision => Self {
                model_path: settings.model_path.clone(),
                chat_model: settings.vision_model.clone(),
                embedding_model: None,
                ranker_model: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub session_id: Option<i64>,
    pub attachments: Vec<String>,
    pub query: Option<String>,
}

impl ChatRequest {
    pub fn for_batch(input: &str, kind: &JobKind, prompts: &PromptSettings) -> Self {
        match kind {
            JobKind::Translate => Self {
                prompt: prompts.render_translation(input),
                session_id: None,
                attachments: Vec::new(),
                query: None,
            },
            JobKind::Vision { attachments } => Self {
                prompt: input.to_string(),
                session_id: None,
                attachments: attachments.clone(),
                query: Some("image".to_string()),
            },
        }
    }
}

/// Opens connections to the inference service.
#[async_trait]
pub trait InferenceConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn InferenceConnection>, ConnectionError>;
}

/// One open connection. Callers hold it through [`crate::ScopedConnection`],
/// which calls `disconnect` when the step that opened it ends.
#[async_trait]
pub trait InferenceConnection: Send {
    async fn load_model(&mut self, request: &LoadModelRequest) -> Result<(), RemoteCallError>;

    async fn chat(&mut self, request: &ChatRequest) -> Result<FragmentStream, RemoteCallError>;

    /// Raw client configuration document, as reported by the service.
    async fn client_config(&mut self) -> Result<String, RemoteCallError>;

    fn disconnect(&mut self);
}
