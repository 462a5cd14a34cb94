use async_trait::async_trait;
use rig::{completion::Prompt, providers};

use super::{LanguageModel, ModelError};

pub struct GeminiModel {
    client: providers::gemini::Client,
    model: String,
    temperature: f64,
}

impl GeminiModel {
    pub fn new(api_key: &str, model: &str, temperature: f64) -> Self {
        Self {
            client: providers::gemini::Client::new(api_key),
            model: model.to_string(),
            temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, ModelError> {
        let mut builder = self.client.agent(&self.model).temperature(self.temperature);
        if let Some(system) = system {
            builder = builder.preamble(system);
        }
        let agent = builder.build();

        let response = agent.prompt(prompt).await?;
        if response.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(response)
    }
}
