//! Request building and execution for The Movie Database JSON API.
//!
//! [`http::RestRequest`] accumulates path segments, query parameters and an optional
//! body; [`http::RestClient`] renders and sends it, retries on HTTP 429, and classifies
//! everything else into an envelope or a typed [`http::RestError`].

pub mod commands;
pub mod config;
pub mod http;
pub mod runtime;
