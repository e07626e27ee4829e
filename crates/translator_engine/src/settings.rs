use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5006".to_string(),
            connect_timeout: Duration::from_secs(15),
            // A translation batch streams for as long as the model keeps generating.
            request_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model_path: String,
    pub chat_model: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub ranker_model: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_path: r"C:\ProgramData\IntelAIA\local_models".to_string(),
            chat_model: "Qwen3-8B-int4-ov".to_string(),
            vision_model: "Phi-3.5-vision-instruct-int4-ov".to_string(),
            embedding_model: "bge-base-en-v1.5-int8-ov".to_string(),
            ranker_model: "bge-reranker-base-int8-ov".to_string(),
        }
    }
}

pub const TEXT_PLACEHOLDER: &str = "{text}";

#[derive(Debug, Clone)]
pub struct PromptSettings {
    /// Translation prompt; `{text}` is replaced by the batch.
    pub translate_template: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            translate_template: "Help me translate the following text into American English. \
                Do not show thinking. </no_think>\n\n {text}"
                .to_string(),
        }
    }
}

impl PromptSettings {
    pub fn render_translation(&self, text: &str) -> String {
        if self.translate_template.contains(TEXT_PLACEHOLDER) {
            self.translate_template.replace(TEXT_PLACEHOLDER, text)
        } else {
            format!("{}\n\n{}", self.translate_template, text)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub service: ServiceSettings,
    pub models: ModelSettings,
    pub prompts: PromptSettings,
}
