//! Request accumulator and its rendered, ready-to-send form.

use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::error::RestError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Where a parameter added through [`RestRequest::add_parameter`] ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    QueryString,
    UrlSegment,
    HttpHeader,
    Cookie,
    RequestBody,
}

/// Parameters for one logical call against an endpoint template such as `/movie/{id}`.
///
/// Rendering borrows the request immutably, so the same value can be re-rendered for
/// every retry attempt.
#[derive(Debug, Clone, Default)]
pub struct RestRequest {
    endpoint: String,
    query: Vec<(String, String)>,
    segments: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    cancel: Option<CancellationToken>,
}

/// A concrete request for a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

impl RestRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn add_query_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    pub fn add_url_segment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.segments.push((key.into(), value.into()));
    }

    pub fn add_parameter(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        kind: ParameterKind,
    ) -> Result<(), RestError> {
        match kind {
            ParameterKind::QueryString => self.add_query_parameter(key, value),
            ParameterKind::UrlSegment => self.add_url_segment(key, value),
            other => return Err(RestError::InvalidParameterKind(other)),
        }
        Ok(())
    }

    /// Stores the payload sent with write calls, replacing any previous one.
    pub fn set_body<B: Serialize>(&mut self, payload: &B) -> Result<(), RestError> {
        let value = serde_json::to_value(payload).map_err(RestError::Serialization)?;
        self.body = Some(value);
        Ok(())
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Makes the call abortable: the token is checked before every send and while
    /// waiting out a rate limit.
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancel = Some(token);
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Renders the request against `base_url`, appending `defaults` after the
    /// caller's own query parameters.
    pub fn render(
        &self,
        method: Method,
        base_url: &str,
        defaults: &[(String, String)],
    ) -> Result<RenderedRequest, RestError> {
        let mut url = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            self.resolve_endpoint()
        );

        let query = self
            .query
            .iter()
            .chain(defaults.iter())
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        let (body, content_type) = match (&self.body, method == Method::POST) {
            (Some(value), true) => (
                Some(serde_json::to_string(value).map_err(RestError::Serialization)?),
                Some(JSON_CONTENT_TYPE),
            ),
            _ => (None, None),
        };

        Ok(RenderedRequest {
            method,
            url,
            body,
            content_type,
        })
    }

    fn resolve_endpoint(&self) -> String {
        let mut path = self.endpoint.clone();
        for (key, value) in &self.segments {
            let placeholder = format!("{{{}}}", key);
            path = path.replace(&placeholder, &urlencoding::encode(value));
        }
        if path.starts_with('/') || path.is_empty() {
            path
        } else {
            format!("/{}", path)
        }
    }
}
