//! Response envelopes returned by the executor.

use std::marker::PhantomData;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::RestError;

/// Structured error body, e.g. `{"status_code": 34, "status_message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status_code: i64,
    pub status_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl StatusMessage {
    /// Best-effort decode of an error body. Malformed bodies yield `None`.
    pub fn decode(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

/// Outcome of one call that was not turned into a [`RestError`].
///
/// Success responses and tolerated 404s both arrive here; check `is_success`.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: StatusCode,
    pub is_success: bool,
    pub content: String,
    pub error: Option<StatusMessage>,
    pub headers: HeaderMap,
}

impl RestResponse {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Decodes the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        serde_json::from_str(&self.content).map_err(RestError::Decode)
    }
}

/// A [`RestResponse`] tagged with the type its body is expected to decode into.
///
/// Nothing is decoded until [`TypedResponse::data`] is called, so a caller that only
/// inspects the status never pays for (or fails on) deserialization.
#[derive(Debug, Clone)]
pub struct TypedResponse<T> {
    response: RestResponse,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TypedResponse<T> {
    pub fn new(response: RestResponse) -> Self {
        Self {
            response,
            _marker: PhantomData,
        }
    }

    pub fn data(&self) -> Result<T, RestError> {
        self.response.json()
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn is_success(&self) -> bool {
        self.response.is_success
    }

    pub fn content(&self) -> &str {
        &self.response.content
    }

    pub fn error(&self) -> Option<&StatusMessage> {
        self.response.error.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    pub fn into_inner(self) -> RestResponse {
        self.response
    }
}
