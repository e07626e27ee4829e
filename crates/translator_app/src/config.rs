use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use translator_core::{ConfigError, StepSettings};
use translator_engine::{
    EngineSettings, ModelSettings, PromptSettings, ServiceSettings,
};
use translator_logging::translator_info;

use crate::cli::Cli;

const DEFAULT_CONFIG_FILE: &str = "translator.ron";
const DEFAULT_SESSION_FILE: &str = ".translator_session.ron";

/// Settings read from `translator.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub model_path: String,
    pub chat_model: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub ranker_model: String,
    pub translate_template: String,
    pub max_batch_size: usize,
    pub max_content_length: usize,
    pub session_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        let steps = StepSettings::default();
        Self {
            server: engine.service.base_url,
            connect_timeout_secs: engine.service.connect_timeout.as_secs(),
            request_timeout_secs: engine.service.request_timeout.as_secs(),
            model_path: engine.models.model_path,
            chat_model: engine.models.chat_model,
            vision_model: engine.models.vision_model,
            embedding_model: engine.models.embedding_model,
            ranker_model: engine.models.ranker_model,
            translate_template: engine.prompts.translate_template,
            max_batch_size: steps.max_batch_size,
            max_content_length: steps.max_content_length,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl AppConfig {
    /// Reads `path`, or `./translator.ron` if it exists, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        translator_info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server = server.clone();
        }
        if let Some(batch_size) = cli.batch_size {
            self.max_batch_size = batch_size;
        }
        if let Some(session) = &cli.session {
            self.session_file = session.clone();
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            service: ServiceSettings {
                base_url: self.server.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            models: ModelSettings {
                model_path: self.model_path.clone(),
                chat_model: self.chat_model.clone(),
                vision_model: self.vision_model.clone(),
                embedding_model: self.embedding_model.clone(),
                ranker_model: self.ranker_model.clone(),
            },
            prompts: PromptSettings {
                translate_template: self.translate_template.clone(),
            },
        }
    }

    pub fn step_settings(&self) -> Result<StepSettings, ConfigError> {
        let settings = StepSettings {
            max_batch_size: self.max_batch_size,
            max_content_length: self.max_content_length,
        };
        settings.validate()?;
        Ok(settings)
    }
}
