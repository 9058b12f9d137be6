//! Generative-text client
//!
//! The rest of the crate talks to the AI service only through
//! [`TextGenerator`]: a prompt and an output format go in, generated text
//! comes out. Callers catch every [`AiError`] and surface it as a toast;
//! nothing here touches application state.

pub mod gemini;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use gemini::GeminiClient;

/// AI client errors
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("AI service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("AI service returned no text")]
    EmptyResponse,

    #[error("AI reply is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

// Request URLs are dropped so a credential can never end up in a message
impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Http(e.without_url())
    }
}

/// Shape the reply should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

impl ResponseFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain",
            ResponseFormat::Json => "application/json",
        }
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub format: ResponseFormat,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Something that turns prompts into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AiError>;
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("code fence pattern is valid")
});

/// Trim `text` and unwrap it from a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(2)) {
        Some(inner) if !inner.as_str().is_empty() => inner.as_str().trim(),
        _ => trimmed,
    }
}

/// Decode a JSON reply, tolerating a code fence around it.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    serde_json::from_str(strip_code_fence(text)).map_err(AiError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_plain_text_is_trimmed() {
        assert_eq!(strip_code_fence("  [1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn test_strip_json_fence() {
        let text = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(strip_code_fence(text), "[{\"a\": 1}]");
    }

    #[test]
    fn test_strip_bare_fence_with_multiple_lines() {
        let text = "\n```\n{\n  \"a\": 1\n}\n```  ";
        assert_eq!(strip_code_fence(text), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_unterminated_fence_is_left_alone() {
        assert_eq!(strip_code_fence("```json\n[1]"), "```json\n[1]");
    }

    #[test]
    fn test_parse_json_reply() {
        let values: Vec<u32> = parse_json_reply("```json\n[1, 2, 3]\n```").unwrap();
        assert_eq!(values, vec![1, 2, 3]);

        let err = parse_json_reply::<Vec<u32>>("not json").unwrap_err();
        assert!(matches!(err, AiError::InvalidJson(_)));
    }

    #[test]
    fn test_request_builders() {
        let request = GenerateRequest::json("find").with_system_instruction("be brief");
        assert_eq!(request.format.mime_type(), "application/json");
        assert_eq!(request.system_instruction.as_deref(), Some("be brief"));
        assert_eq!(GenerateRequest::text("hi").format, ResponseFormat::Text);
    }
}
