use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::Method;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ClientConfig,
    http::{RestClient, RestRequest},
    runtime::Runtime,
};

mod param_spec;

pub use param_spec::ParamSpec;

/// Settings that override what the environment provides.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub max_retries: Option<u32>,
    pub timeout: Option<Duration>,
}

/// One API call described on the command line.
#[derive(Debug, Clone, Default)]
pub struct CallSpec {
    pub endpoint: String,
    pub segments: Vec<ParamSpec>,
    pub query: Vec<ParamSpec>,
    /// Raw JSON text for the request body.
    pub body: Option<String>,
    pub pretty: bool,
}

impl CallSpec {
    pub fn to_request(&self) -> Result<RestRequest> {
        let mut request = RestRequest::new(&self.endpoint);
        for segment in &self.segments {
            request.add_url_segment(&segment.key, &segment.value);
        }
        for param in &self.query {
            request.add_query_parameter(&param.key, &param.value);
        }
        if let Some(body) = &self.body {
            let value: serde_json::Value =
                serde_json::from_str(body).context("Request body is not valid JSON")?;
            request.set_body(&value)?;
        }
        Ok(request)
    }
}

/// Execute a single call and print its body.
#[tracing::instrument(skip(runtime, spec, overrides, cancel))]
pub async fn call<R: Runtime + 'static>(
    runtime: R,
    method: Method,
    spec: CallSpec,
    overrides: Overrides,
    cancel: CancellationToken,
) -> Result<()> {
    let config = resolve_config(&runtime, overrides)?;
    let http = config.build_http_client()?;
    let client = RestClient::with_runtime(http, config, runtime);

    let output = run(&client, method, &spec, Some(cancel)).await?;
    println!("{}", output);
    Ok(())
}

pub(crate) fn resolve_config<R: Runtime>(runtime: &R, overrides: Overrides) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env(runtime)?;
    if let Some(api_url) = overrides.api_url {
        config.base_url = api_url;
    }
    if let Some(retries) = overrides.max_retries {
        config.max_retry_count = retries;
    }
    if let Some(timeout) = overrides.timeout {
        config = config.with_timeout(timeout);
    }
    debug!("Using API at {}", config.base_url);
    Ok(config)
}

/// Runs the call and returns the text to print.
pub async fn run<R: Runtime>(
    client: &RestClient<R>,
    method: Method,
    spec: &CallSpec,
    cancel: Option<CancellationToken>,
) -> Result<String> {
    let mut request = spec.to_request()?;
    if let Some(token) = cancel {
        request.set_cancellation(token);
    }

    let response = client
        .execute(method.clone(), &request)
        .await
        .with_context(|| format!("{} {} failed", method, spec.endpoint))?;

    if response.is_not_found() {
        match &response.error {
            Some(msg) => bail!("Not found: {} ({})", spec.endpoint, msg.status_message),
            None => bail!("Not found: {}", spec.endpoint),
        }
    }

    if spec.pretty {
        let value: serde_json::Value =
            serde_json::from_str(&response.content).context("Response body is not valid JSON")?;
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(response.content)
}
