//! Transport seam and its reqwest implementation.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{Level, log};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;

use super::case::{camelize_keys, snakeize_keys};
use super::retry::with_retry;
use super::types::{ApiRequest, RawResponse};
use crate::config::Configuration;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("authsignal-rust/", env!("CARGO_PKG_VERSION"));

/// Performs one request/response exchange with the API.
///
/// Transport failures come back as `Err`. Any response the server produced,
/// whatever its status, comes back as `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, config: &Configuration, request: &ApiRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport with JSON key-case conversion and transport retries.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest Client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Single attempt without retry.
    async fn send_once(&self, config: &Configuration, request: &ApiRequest) -> Result<RawResponse> {
        let url = request_url(&config.api_url, request)?;
        let level = if config.debug { Level::Info } else { Level::Debug };
        log!(level, "{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .timeout(config.timeout)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(secret) = &config.api_secret_key {
            builder = builder.basic_auth(secret, Some(""));
        }
        if let Some(body) = &request.body {
            builder = builder.json(&camelize_keys(body.clone()));
        }

        let response = builder
            .send()
            .await
            .context("Failed to send request to Authsignal API")?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .context("Failed to read response body from Authsignal API")?;
        log!(level, "{} {} -> {} {}", request.method, request.display_path(), status, text);

        Ok(RawResponse {
            status: Some(status),
            body: parse_body(&text),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, config))]
    async fn send(&self, config: &Configuration, request: &ApiRequest) -> Result<RawResponse> {
        let operation_name = format!("{} {}", request.method, request.display_path());
        with_retry(&config.retry, &request.method, &operation_name, || {
            self.send_once(config, request)
        })
        .await
    }
}

/// Joins the base URL with the request path segments and query.
fn request_url(api_url: &str, request: &ApiRequest) -> Result<Url> {
    let mut url = Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;

    url.path_segments_mut()
        .map_err(|_| anyhow!("API URL cannot be a base: {}", api_url))?
        .pop_if_empty()
        .extend(&request.path);

    if !request.query.is_empty() {
        url.query_pairs_mut().extend_pairs(&request.query);
    }

    Ok(url)
}

/// Parses a response body, snake-casing its keys. Empty or non-JSON text yields `None`.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(text).ok().map(snakeize_keys)
}
