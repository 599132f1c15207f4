//! HTTP executor with rate-limit retry and response classification.

use anyhow::Result;
use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::runtime::{RealRuntime, Runtime};

use super::error::RestError;
use super::request::{RenderedRequest, RestRequest};
use super::response::{RestResponse, StatusMessage, TypedResponse};
use super::retry::{Outcome, classify_status, is_json_content_type, rate_limit_delay};

/// Sends [`RestRequest`]s against one configured API.
///
/// Cloning is cheap; clones share the connection pool and configuration.
pub struct RestClient<R: Runtime = RealRuntime> {
    client: Client,
    config: Arc<ClientConfig>,
    runtime: Arc<R>,
}

impl<R: Runtime> Clone for RestClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl RestClient<RealRuntime> {
    /// Creates a client with its own connection pool built from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        Ok(Self::with_runtime(client, config, RealRuntime))
    }
}

impl<R: Runtime> RestClient<R> {
    /// Creates a client over an existing reqwest Client and a custom runtime.
    pub fn with_runtime(client: Client, config: ClientConfig, runtime: R) -> Self {
        Self {
            client,
            config: Arc::new(config),
            runtime: Arc::new(runtime),
        }
    }

    /// Returns the configuration shared by every call.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET request and returns the raw envelope.
    pub async fn execute_get(&self, request: &RestRequest) -> Result<RestResponse, RestError> {
        self.execute(Method::GET, request).await
    }

    /// Performs a POST request, sending the body if one is set.
    pub async fn execute_post(&self, request: &RestRequest) -> Result<RestResponse, RestError> {
        self.execute(Method::POST, request).await
    }

    /// Performs a DELETE request and returns the raw envelope.
    pub async fn execute_delete(&self, request: &RestRequest) -> Result<RestResponse, RestError> {
        self.execute(Method::DELETE, request).await
    }

    /// Performs a GET request whose body decodes into `T` on demand.
    pub async fn execute_get_as<T: DeserializeOwned>(
        &self,
        request: &RestRequest,
    ) -> Result<TypedResponse<T>, RestError> {
        self.execute(Method::GET, request).await.map(TypedResponse::new)
    }

    /// Performs a POST request whose body decodes into `T` on demand.
    pub async fn execute_post_as<T: DeserializeOwned>(
        &self,
        request: &RestRequest,
    ) -> Result<TypedResponse<T>, RestError> {
        self.execute(Method::POST, request).await.map(TypedResponse::new)
    }

    /// Performs a DELETE request whose body decodes into `T` on demand.
    pub async fn execute_delete_as<T: DeserializeOwned>(
        &self,
        request: &RestRequest,
    ) -> Result<TypedResponse<T>, RestError> {
        self.execute(Method::DELETE, request)
            .await
            .map(TypedResponse::new)
    }

    /// Sends `request` until it yields an envelope, a non-retryable error, or the
    /// rate-limit budget runs out. Only HTTP 429 is retried.
    #[tracing::instrument(skip(self, request), fields(endpoint = request.endpoint()))]
    pub async fn execute(
        &self,
        method: Method,
        request: &RestRequest,
    ) -> Result<RestResponse, RestError> {
        let max_retries = self.config.max_retry_count;
        let max_attempts = max_retries.saturating_add(1);
        let mut retries: u32 = 0;

        loop {
            check_cancelled(request)?;

            let rendered = request.render(
                method.clone(),
                &self.config.base_url,
                &self.config.default_params,
            )?;
            debug!(
                "{} {} (attempt {}/{})",
                rendered.method,
                request.endpoint(),
                retries.saturating_add(1),
                max_attempts
            );

            let response = self.send(&rendered).await?;
            let status = response.status();
            let headers = response.headers().clone();

            if !is_json_content_type(&headers) {
                let content_type = headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                debug!(
                    "{}: non-JSON response {:?} (HTTP {})",
                    request.endpoint(),
                    content_type,
                    status
                );
                return Err(RestError::UnexpectedContentType {
                    status,
                    content_type,
                });
            }

            let content = response.text().await.map_err(RestError::NetworkFailure)?;
            let is_success = status.is_success();
            let error = if is_success {
                None
            } else {
                StatusMessage::decode(&content)
            };

            match classify_status(status) {
                Outcome::RateLimited => {
                    if retries >= max_retries {
                        warn!(
                            "{}: rate limited, giving up after {} attempt(s)",
                            request.endpoint(),
                            retries.saturating_add(1)
                        );
                        return Err(RestError::RetryBudgetExceeded {
                            status,
                            message: error,
                        });
                    }

                    let delay = rate_limit_delay(&headers, self.runtime.now());
                    warn!(
                        "{}: rate limited (attempt {}/{}), retrying in {}ms...",
                        request.endpoint(),
                        retries.saturating_add(1),
                        max_attempts,
                        delay.as_millis()
                    );
                    self.wait(request, delay).await?;
                    retries += 1;
                }
                Outcome::Unauthorized => {
                    return Err(RestError::Unauthorized { message: error });
                }
                Outcome::Upstream => {
                    debug!("{}: upstream error HTTP {}", request.endpoint(), status);
                    return Err(RestError::UpstreamError {
                        status,
                        message: error,
                    });
                }
                Outcome::Return => {
                    return Ok(RestResponse {
                        status,
                        is_success,
                        content,
                        error,
                        headers,
                    });
                }
            }
        }
    }

    async fn send(&self, rendered: &RenderedRequest) -> Result<Response, RestError> {
        let url = Url::parse(&rendered.url).map_err(|e| RestError::InvalidUrl {
            url: rendered.url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = self.client.request(rendered.method.clone(), url);
        if let (Some(body), Some(content_type)) = (&rendered.body, rendered.content_type) {
            builder = builder.header(CONTENT_TYPE, content_type).body(body.clone());
        }

        builder.send().await.map_err(RestError::NetworkFailure)
    }

    /// Sleeps through a rate limit unless the request is cancelled first.
    async fn wait(&self, request: &RestRequest, delay: Duration) -> Result<(), RestError> {
        match request.cancellation() {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(RestError::Cancelled),
                    _ = self.runtime.sleep(delay) => Ok(()),
                }
            }
            None => {
                self.runtime.sleep(delay).await;
                Ok(())
            }
        }
    }
}

fn check_cancelled(request: &RestRequest) -> Result<(), RestError> {
    match request.cancellation() {
        Some(token) if token.is_cancelled() => Err(RestError::Cancelled),
        _ => Ok(()),
    }
}
