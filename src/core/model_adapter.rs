//! Adapter between a [`Conversation`] and the hosted generation endpoint.
//!
//! [`ReplyGenerator::generate`] never fails: transport errors, error statuses,
//! and odd response bodies all come back as reply text, which the controller
//! stores like any other assistant message.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{Content, GenerateRequest, GenerateResponse, GenerationConfig};
use crate::core::constants::{
    API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION,
    INSTRUCTION_TAG, NO_RESPONSE_REPLY, NO_TEXT_REPLY, REQUEST_TIMEOUT, TEMPERATURE,
};
use crate::core::message::{Conversation, Role};
use crate::utils::url::generate_content_url;

/// Produces the assistant's reply to `prompt` given the conversation so far.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, conversation: &Conversation) -> String;
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub system_instruction: String,
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn endpoint(&self) -> String {
        generate_content_url(&self.base_url, &self.model)
    }
}

/// Builds the request body: the tagged instruction turn, every non-empty
/// message of `conversation`, then `prompt`.
pub fn build_request(
    system_instruction: &str,
    prompt: &str,
    conversation: &Conversation,
) -> GenerateRequest {
    let mut contents = Vec::with_capacity(conversation.len() + 2);
    contents.push(Content::text(
        Role::User.to_api_role(),
        format!("{INSTRUCTION_TAG}\n{system_instruction}"),
    ));

    contents.extend(
        conversation
            .iter()
            .filter(|message| !message.content().is_empty())
            .map(|message| Content::text(message.role().to_api_role(), message.content())),
    );

    contents.push(Content::text(Role::User.to_api_role(), prompt));

    GenerateRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
        },
    }
}

/// Turns a successful response body into reply text.
pub fn extract_reply(body: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => return format!("Parse error: {err}"),
    };
    // Derived visitors also accept a JSON array in place of the object.
    if !value.is_object() {
        return "Parse error: expected a JSON object".to_string();
    }
    let response: GenerateResponse = match serde_json::from_value(value) {
        Ok(response) => response,
        Err(err) => return format!("Parse error: {err}"),
    };

    let Some(candidate) = response.candidates.unwrap_or_default().into_iter().next() else {
        return NO_RESPONSE_REPLY.to_string();
    };

    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    let text = text.trim();
    if text.is_empty() {
        NO_TEXT_REPLY.to_string()
    } else {
        text.to_string()
    }
}

fn format_status_error(status: reqwest::StatusCode, body: &str) -> String {
    format!("Error: {} - {}", status.as_u16(), body)
}

pub struct GeminiClient {
    client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    /// Uses a caller-built client as is; `settings.timeout` is not applied.
    pub fn with_client(client: reqwest::Client, settings: GeminiSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, conversation: &Conversation) -> String {
        let request = build_request(&self.settings.system_instruction, prompt, conversation);
        let endpoint = self.settings.endpoint();
        debug!(
            endpoint = %endpoint,
            turns = request.contents.len(),
            "sending generation request"
        );

        let response = match self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "generation request failed");
                return format!("Request error: {err}");
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "failed to read generation response");
                return format!("Request error: {err}");
            }
        };

        if !status.is_success() {
            warn!(status = status.as_u16(), "generation endpoint returned an error");
            return format_status_error(status, &body);
        }

        debug!(bytes = body.len(), "generation response received");
        extract_reply(&body)
    }
}
