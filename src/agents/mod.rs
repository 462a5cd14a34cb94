//! Hosted generation model clients.
//!
//! Every pipeline step talks to the model through [`LanguageModel`], so the
//! steps can run against a canned fake in tests. Concrete clients are built per
//! request from the API key the user pasted into the form.

use async_trait::async_trait;

mod gemini;
mod openai_compat;

pub use gemini::GeminiModel;
pub use openai_compat::OpenAiCompatModel;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_OPENAI_BASE: &str = "http://127.0.0.1:11434/v1";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("prompt failed: {0}")]
    Prompt(#[from] rig::completion::PromptError),
    #[error("chat completion failed: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),
    #[error("model returned no content")]
    EmptyResponse,
}

/// Text generation capability: optional system message plus a user prompt in,
/// generated text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, ModelError>;
}

/// Builds a model handle for a single invocation.
pub trait ModelFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Box<dyn LanguageModel>, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Provider {
    /// Google Gemini through rig
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat endpoint (OpenAI, Ollama, vLLM, ...)
    Openai,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub provider: Provider,
    pub model: String,
    pub temperature: f64,
    pub api_base: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_base: DEFAULT_OPENAI_BASE.to_string(),
        }
    }
}

impl ModelFactory for ModelSettings {
    fn connect(&self, api_key: &str) -> Result<Box<dyn LanguageModel>, ModelError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ModelError::MissingApiKey);
        }
        tracing::debug!(provider = ?self.provider, model = %self.model, "initializing model client");
        Ok(match self.provider {
            Provider::Gemini => Box::new(GeminiModel::new(api_key, &self.model, self.temperature)),
            Provider::Openai => Box::new(OpenAiCompatModel::new(
                api_key,
                &self.api_base,
                &self.model,
                self.temperature,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_gemini() {
        let settings = ModelSettings::default();
        assert_eq!(settings.provider, Provider::Gemini);
        assert_eq!(settings.model, "gemini-1.5-flash");
        assert_eq!(settings.temperature, 0.8);
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let settings = ModelSettings::default();
        assert!(matches!(settings.connect("   "), Err(ModelError::MissingApiKey)));
    }

    #[test]
    fn connect_builds_each_provider() {
        let mut settings = ModelSettings::default();
        assert!(settings.connect("key").is_ok());
        settings.provider = Provider::Openai;
        assert!(settings.connect("key").is_ok());
    }
}
