//! Ollama client implementation
//!
//! Async HTTP client for the Ollama chat API, non-streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{AegisError, Config, Message, Result};
use crate::llm::traits::{FormatHint, ModelProvider};

/// Ollama API client
#[derive(Clone)]
pub struct OllamaModel {
    client: Client,
    base_url: String,
    model: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    stream: bool,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Ollama chat response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaModel {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.ollama.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.ollama_url(),
            model: config.ollama.model.clone(),
        }
    }

    /// Create a client with a custom base URL and model
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// The model this client is configured to use
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert internal Message to Ollama format
    fn to_ollama_message(msg: &Message) -> OllamaMessage {
        OllamaMessage {
            role: msg.role.clone(),
            content: msg.content.clone(),
        }
    }

    fn connect_error(&self, e: reqwest::Error) -> AegisError {
        if e.is_connect() {
            AegisError::model(format!(
                "Cannot connect to Ollama at {}. Is it running?",
                self.base_url
            ))
        } else {
            AegisError::from(e)
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaModel {
    async fn complete(&self, messages: &[Message], format: FormatHint) -> Result<String> {
        let ollama_messages: Vec<OllamaMessage> =
            messages.iter().map(Self::to_ollama_message).collect();

        let request = ChatRequest {
            model: &self.model,
            messages: ollama_messages,
            format: match format {
                FormatHint::Json => Some("json"),
                FormatHint::Text | FormatHint::None => None,
            },
            stream: false,
        };

        tracing::debug!(model = %self.model, ?format, "sending chat request");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("not found") {
                return Err(AegisError::ModelNotFound(self.model.clone()));
            }

            return Err(AegisError::model(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| AegisError::model(format!("Failed to parse response: {}", e)))?;

        Ok(chat_response.message.content)
    }

    async fn check_ready(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            return Err(AegisError::model("Failed to list models"));
        }

        let models_response: ModelsResponse = response.json().await?;
        let available = models_response.models.iter().any(|m| {
            m.name == self.model || m.name.split(':').next() == self.model.split(':').next()
        });

        if !available {
            return Err(AegisError::ModelNotFound(self.model.clone()));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaModel::with_base_url("http://localhost:11434", "llama3");
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "llama3");
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message::user("Hello");
        let ollama_msg = OllamaModel::to_ollama_message(&msg);
        assert_eq!(ollama_msg.role, "user");
        assert_eq!(ollama_msg.content, "Hello");
    }
}
