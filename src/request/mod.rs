//! REST and GraphQL request clients.
//!
//! The clients build requests (URL, merged headers, JSON body, settings) and
//! hand them to a [`Transport`], which owns the actual HTTP exchange. Failed
//! exchanges are retried with exponential backoff up to
//! [`RequestSettings::max_retries`] times.

mod api;
mod graphql;

pub use api::ApiClient;
pub use graphql::GraphqlClient;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backoff::{ExponentialBackoff, MAX_RETRY_DELAY};
use crate::error::{Error, Result};

/// Header name to value.
pub type Headers = BTreeMap<String, String>;

/// HTTP verbs the API client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Returns the method as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-client request settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSettings {
    /// Time allowed for one exchange.
    pub timeout: Duration,
    /// Retries after the first failed exchange.
    pub max_retries: u32,
    /// Whether the transport should accept invalid certificates.
    pub ignore_https_errors: bool,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_delay: Duration,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 3,
            ignore_https_errors: true,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Partial settings; only the fields that are set override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsOverride {
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub ignore_https_errors: Option<bool>,
    pub retry_delay: Option<Duration>,
}

impl RequestSettings {
    /// Applies the fields present in `overrides`.
    pub fn define(&mut self, overrides: SettingsOverride) {
        if let Some(timeout) = overrides.timeout {
            self.timeout = timeout;
        }
        if let Some(max_retries) = overrides.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(ignore) = overrides.ignore_https_errors {
            self.ignore_https_errors = ignore;
        }
        if let Some(delay) = overrides.retry_delay {
            self.retry_delay = delay;
        }
    }
}

/// A fully built request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Value,
    pub settings: RequestSettings,
}

/// What a transport hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body.
    pub body: Value,
}

/// Performs HTTP exchanges on behalf of the clients.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the parsed response.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// Returns the name of this transport.
    fn name(&self) -> &str;
}

/// Merges `extra` over `base`; keys in `extra` win.
pub(crate) fn merge_headers(base: &Headers, extra: &Headers) -> Headers {
    let mut merged = base.clone();
    merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Sends a request, retrying failed or timed-out exchanges.
pub(crate) async fn dispatch<T>(transport: &T, request: &HttpRequest, verbose: bool) -> Result<Value>
where
    T: Transport + ?Sized,
{
    let settings = request.settings;
    let mut backoff = ExponentialBackoff::new(settings.retry_delay, MAX_RETRY_DELAY);

    loop {
        let outcome = match tokio::time::timeout(settings.timeout, transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Request(format!(
                "timed out after {} ms",
                settings.timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(response) => {
                if verbose {
                    tracing::debug!(
                        transport = transport.name(),
                        method = %request.method,
                        url = %request.url,
                        headers = ?request.headers,
                        request_body = %request.body,
                        status = response.status,
                        response_body = %response.body,
                        "request debug information"
                    );
                }
                return Ok(response.body);
            }
            Err(e) if backoff.attempts() < settings.max_retries => {
                let delay = backoff.next_delay();
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    attempt = backoff.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(
                    method = %request.method,
                    url = %request.url,
                    error = %e,
                    "error sending request"
                );
                return Err(match e {
                    Error::Request(msg) => Error::Request(msg),
                    other => Error::Request(other.to_string()),
                });
            }
        }
    }
}
