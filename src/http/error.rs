//! Typed errors surfaced by the request executor.

use reqwest::StatusCode;
use thiserror::Error;

use super::request::ParameterKind;
use super::response::StatusMessage;

/// Terminal failure of a single logical API call.
///
/// None of these are retried by [`RestClient`](super::RestClient); the only condition that
/// triggers a retry (HTTP 429) is handled inside the executor and only escapes as
/// [`RestError::RetryBudgetExceeded`] once the budget is spent.
#[derive(Debug, Error)]
pub enum RestError {
    /// The request never produced an HTTP response (DNS, connect, timeout, body read).
    #[error("Network failure: {0}")]
    NetworkFailure(#[source] reqwest::Error),

    /// The server answered with something other than JSON.
    #[error("Unexpected content type {content_type:?} (HTTP {status})")]
    UnexpectedContentType {
        status: StatusCode,
        content_type: Option<String>,
    },

    /// HTTP 401.
    #[error("Unauthorized{}. Check your API key.", describe(.message))]
    Unauthorized { message: Option<StatusMessage> },

    /// Any other non-success status except 404 and 429.
    #[error("Upstream error: HTTP {status}{}", describe(.message))]
    UpstreamError {
        status: StatusCode,
        message: Option<StatusMessage>,
    },

    /// Every permitted attempt was rate limited.
    #[error("Rate limit exceeded after all retries (HTTP {status}){}", describe(.message))]
    RetryBudgetExceeded {
        status: StatusCode,
        message: Option<StatusMessage>,
    },

    #[error("Parameter kind {0:?} is not supported by this client")]
    InvalidParameterKind(ParameterKind),

    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Request was cancelled")]
    Cancelled,
}

impl RestError {
    /// The HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestError::UnexpectedContentType { status, .. }
            | RestError::UpstreamError { status, .. }
            | RestError::RetryBudgetExceeded { status, .. } => Some(*status),
            RestError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// The decoded error body, if the server sent one.
    pub fn status_message(&self) -> Option<&StatusMessage> {
        match self {
            RestError::Unauthorized { message }
            | RestError::UpstreamError { message, .. }
            | RestError::RetryBudgetExceeded { message, .. } => message.as_ref(),
            _ => None,
        }
    }
}

fn describe(message: &Option<StatusMessage>) -> String {
    match message {
        Some(m) => format!(": {} (code {})", m.status_message, m.status_code),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Option<StatusMessage> {
        Some(StatusMessage {
            status_code: 7,
            status_message: "Invalid API key: You must be granted a valid key.".to_string(),
            success: Some(false),
        })
    }

    #[test]
    fn test_unauthorized_display() {
        let err = RestError::Unauthorized { message: message() };
        let text = err.to_string();
        assert!(text.contains("Unauthorized"));
        assert!(text.contains("Invalid API key"));
        assert!(text.contains("code 7"));
        assert!(text.contains("API key"));
    }

    #[test]
    fn test_upstream_error_display_without_message() {
        let err = RestError::UpstreamError {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(err.to_string(), "Upstream error: HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_status_accessor() {
        let err = RestError::RetryBudgetExceeded {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: None,
        };
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));

        let err = RestError::Unauthorized { message: None };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

        assert_eq!(RestError::Cancelled.status(), None);
    }

    #[test]
    fn test_status_message_accessor() {
        let err = RestError::UpstreamError {
            status: StatusCode::BAD_REQUEST,
            message: message(),
        };
        assert_eq!(err.status_message().map(|m| m.status_code), Some(7));

        let err = RestError::UnexpectedContentType {
            status: StatusCode::OK,
            content_type: Some("text/html".to_string()),
        };
        assert!(err.status_message().is_none());
    }
}
