//! Request building and execution with rate-limit retry and typed errors.

mod client;
mod error;
mod request;
mod response;
mod retry;

pub use client::RestClient;
pub use error::RestError;
pub use request::{JSON_CONTENT_TYPE, ParameterKind, RenderedRequest, RestRequest};
pub use response::{RestResponse, StatusMessage, TypedResponse};
pub use retry::{
    MAX_RETRIES, Outcome, RETRY_DELAY_MS, classify_status, is_json_content_type,
    parse_retry_after, rate_limit_delay,
};
