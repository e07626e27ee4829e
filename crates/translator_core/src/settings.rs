use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 200;
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("max content length must be greater than zero")]
    ZeroContentLength,
}

/// Size limits captured by a session when it is created. Both are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSettings {
    pub max_batch_size: usize,
    pub max_content_length: usize,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl StepSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.max_content_length == 0 {
            return Err(ConfigError::ZeroContentLength);
        }
        Ok(())
    }
}
