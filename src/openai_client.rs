// src/openai_client.rs
//
// Thin client for the OpenAI chat-completions endpoint. One fixed model,
// no retry or backoff: a failed call fails the current request.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_MODEL: &str = "gpt-4o-2024-11-20";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub role: String,
    pub content: String,
}

impl ChatMessagePayload {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessagePayload>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Sends the full ordered message list and returns the trimmed text reply.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessagePayload>,
    ) -> Result<String, String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
        };

        tracing::debug!(
            "OpenAI request: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Request error: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        if !status.is_success() {
            tracing::error!("OpenAI API error ({}): {}", status, response_text);
            return Err(format!("API error ({}): {}", status, response_text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| "No content returned from the completion API".to_string())?;

        Ok(reply.trim().to_string())
    }

}

lazy_static! {
    static ref JSON_OBJECT_RE: Regex = Regex::new(r"\{[\s\S]*\}").expect("valid regex");
}

/// Strict decode first; on failure, best-effort extraction of the first
/// brace-delimited region; on failure, an explicit parse error.
pub fn parse_structured_reply(reply: &str) -> Result<Value, String> {
    if let Ok(value) = serde_json::from_str::<Value>(reply) {
        return Ok(value);
    }

    if let Some(m) = JSON_OBJECT_RE.find(reply) {
        if let Ok(value) = serde_json::from_str::<Value>(m.as_str()) {
            return Ok(value);
        }
    }

    Err("No valid JSON found in the model response".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let value = parse_structured_reply(r#"{"title": "Cats", "slides": []}"#).unwrap();
        assert_eq!(value["title"], "Cats");
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let reply = "Sure! Here is your deck:\n{\"title\": \"Cats\", \"slides\": []}\nEnjoy.";
        let value = parse_structured_reply(reply).unwrap();
        assert_eq!(value["title"], "Cats");
    }

    #[test]
    fn test_wrapped_and_bare_parse_identically() {
        let bare = r#"{"metadata": {"title": "X"}, "sections": []}"#;
        let wrapped = format!("Here you go:\n```\n{}\n```", bare);

        let direct = parse_structured_reply(bare).unwrap();
        let extracted = parse_structured_reply(&wrapped).unwrap();
        assert_eq!(direct, extracted);
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        assert!(parse_structured_reply("I cannot do that.").is_err());
        assert!(parse_structured_reply("{not valid json").is_err());
    }
}
