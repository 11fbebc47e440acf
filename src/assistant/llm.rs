use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CaixaError, Result};
use crate::settings::Settings;

/// Opaque text completion service.
pub trait LlmClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            temperature: 0.2,
            timeout_secs: 60,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut client = Self::new(&settings.llm_base_url, &settings.llm_model, settings.api_key());
        client.temperature = settings.llm_temperature;
        client.timeout_secs = settings.llm_timeout_secs;
        client
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl LlmClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CaixaError::Collaborator("OPENAI_API_KEY is not set".to_string()));
        };

        // Built per call: the blocking client must not live on an async executor.
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| CaixaError::Collaborator(e.to_string()))?;

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    CaixaError::Collaborator(format!("LLM timed out after {}s", self.timeout_secs))
                } else {
                    CaixaError::Collaborator(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(CaixaError::Collaborator(format!("LLM returned {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| CaixaError::Collaborator(format!("unreadable LLM response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CaixaError::Collaborator("LLM returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_collaborator_failure() {
        let client = OpenAiClient::new("http://127.0.0.1:9/v1/", "gpt-4o-mini", None);
        assert_eq!(client.base_url, "http://127.0.0.1:9/v1");
        let err = client.complete("oi").unwrap_err();
        assert!(matches!(err, CaixaError::Collaborator(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            temperature: 0.2,
            messages: vec![ChatMessage {
                role: "user",
                content: "Pergunta: oi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Pergunta: oi");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Reduza custos fixos."}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Reduza custos fixos.")
        );
    }
}
