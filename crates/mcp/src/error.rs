//! Tool client errors and failure classification

use serde_json::Value;
use thiserror::Error;

/// How a failed tool call should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient transport trouble; worth another attempt
    Retryable,
    /// Caller supplied bad arguments; retrying the same call cannot help
    Parameter,
    /// Anything else
    Unclassified,
}

const PARAMETER_KEYWORDS: &[&str] = &[
    "parameter",
    "argument",
    "validation",
    "invalid",
    "required",
    "missing",
];

const TYPE_HINTS: &[&str] = &[
    "int", "integer", "str", "string", "float", "number", "bool", "boolean", "dict", "list",
    "array", "object",
];

const RETRYABLE_EXACT: &[&str] = &["ClosedResourceError", "SSE"];

const RETRYABLE_KEYWORDS: &[&str] = &["stream", "connection", "timeout", "timed out"];

fn mentions_type_mismatch(lower: &str) -> bool {
    lower.contains("type")
        && lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| TYPE_HINTS.contains(&word))
}

/// Classify a failure from its message alone.
///
/// Parameter errors win over retryable ones, so a validation message that
/// also mentions a connection is never retried.
pub fn classify_message(message: &str) -> FailureClass {
    let lower = message.to_lowercase();

    if PARAMETER_KEYWORDS.iter().any(|k| lower.contains(k)) || mentions_type_mismatch(&lower) {
        return FailureClass::Parameter;
    }

    if RETRYABLE_EXACT.iter().any(|k| message.contains(k))
        || RETRYABLE_KEYWORDS.iter().any(|k| lower.contains(k))
    {
        return FailureClass::Retryable;
    }

    FailureClass::Unclassified
}

/// Tool client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("MCP tool error: {0}")]
    Remote(Value),

    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("tool client is closed")]
    Closed,
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            McpError::Decode(err.to_string())
        } else {
            McpError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Decode(err.to_string())
    }
}

impl McpError {
    /// Structured classification, falling back to the message where the
    /// variant alone does not decide it
    pub fn class(&self) -> FailureClass {
        match self {
            McpError::Transport(err) if err.is_builder() => FailureClass::Unclassified,
            McpError::Transport(_) => FailureClass::Retryable,
            McpError::Status { status, body, .. } => match status {
                408 | 429 | 500..=599 => FailureClass::Retryable,
                _ => classify_message(body),
            },
            McpError::Remote(payload) => classify_message(&payload_text(payload)),
            McpError::InvalidArguments { .. } => FailureClass::Parameter,
            McpError::Decode(_) | McpError::Closed => FailureClass::Unclassified,
        }
    }
}

/// Text of a remote error payload: the `message` field when present
pub fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => payload.to_string(),
        },
        other => other.to_string(),
    }
}
