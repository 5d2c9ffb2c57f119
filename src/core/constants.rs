//! Shared constants used across the application

use std::time::Duration;

/// Base URL of the hosted generation API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature sent with every generation request.
pub const TEMPERATURE: f64 = 0.7;

/// Upper bound on a single generation request, connect to last byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the API key on generation requests.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable read for the tracing filter.
pub const LOG_ENV: &str = "GEMCHAT_LOG";

pub const SNAPSHOT_FILE_NAME: &str = "conversation_memory.json";

/// Prefix marking the instruction turn so the model can tell it apart from
/// text the user actually typed.
pub const INSTRUCTION_TAG: &str = "[SYSTEM INSTRUCTION]";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a proactive, helpful AI agent built for a \
persistent chat experience. Summarize, suggest, or build on the user's last message when possible.";

pub const DEFAULT_GREETING: &str = "Hello! I'm your Gemini assistant. Ask me anything, and I'll \
remember our conversation between sessions.";

pub const NO_RESPONSE_REPLY: &str = "No response from model.";
pub const NO_TEXT_REPLY: &str = "No text in response.";
