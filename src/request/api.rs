//! REST API client.

use serde_json::{json, Value};

use crate::config::ResolvedEnv;
use crate::error::{Error, Result};

use super::{dispatch, merge_headers, Headers, HttpMethod, HttpRequest, RequestSettings, SettingsOverride, Transport};

/// Sends JSON requests to endpoints below a base URL.
pub struct ApiClient<T: Transport> {
    transport: T,
    base_url: String,
    headers: Headers,
    settings: RequestSettings,
    verbose: bool,
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client for the given base URL.
    pub fn new(transport: T, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(Error::Config(
                "API URL is not defined in the environment configuration".into(),
            ));
        }
        Ok(Self {
            transport,
            base_url,
            headers: Headers::new(),
            settings: RequestSettings::default(),
            verbose: false,
        })
    }

    /// Creates a client for the API of a resolved environment.
    pub fn for_env(transport: T, env: &ResolvedEnv) -> Result<Self> {
        Ok(Self::new(transport, &env.api_url)?
            .with_headers(env.api_headers.clone())
            .with_verbose(env.verbose))
    }

    /// Sets the headers sent with every request.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Enables request/response debug logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Overrides request settings; fields left unset keep their value.
    pub fn define_conf(&mut self, overrides: SettingsOverride) -> &mut Self {
        self.settings.define(overrides);
        self
    }

    /// Returns the current request settings.
    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    /// Joins the base URL and an endpoint with exactly one slash.
    pub fn url_for(&self, endpoint: &str) -> String {
        let base = self.base_url.strip_suffix('/').unwrap_or(&self.base_url);
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        format!("{}/{}", base, endpoint)
    }

    /// Sends a request and returns the JSON response body.
    pub async fn send_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Value,
        headers: &Headers,
    ) -> Result<Value> {
        let request = HttpRequest {
            method,
            url: self.url_for(endpoint),
            headers: merge_headers(&self.headers, headers),
            body,
            settings: self.settings,
        };
        dispatch(&self.transport, &request, self.verbose).await
    }

    /// Sends a GET request.
    pub async fn get(&self, endpoint: &str, headers: &Headers) -> Result<Value> {
        self.send_request(endpoint, HttpMethod::Get, json!({}), headers)
            .await
    }

    /// Sends a POST request.
    pub async fn post(&self, endpoint: &str, body: Value, headers: &Headers) -> Result<Value> {
        self.send_request(endpoint, HttpMethod::Post, body, headers).await
    }

    /// Sends a PUT request.
    pub async fn put(&self, endpoint: &str, body: Value, headers: &Headers) -> Result<Value> {
        self.send_request(endpoint, HttpMethod::Put, body, headers).await
    }

    /// Sends a PATCH request.
    pub async fn patch(&self, endpoint: &str, body: Value, headers: &Headers) -> Result<Value> {
        self.send_request(endpoint, HttpMethod::Patch, body, headers).await
    }

    /// Sends a DELETE request with an empty body.
    pub async fn delete(&self, endpoint: &str, headers: &Headers) -> Result<Value> {
        self.send_request(endpoint, HttpMethod::Delete, json!({}), headers)
            .await
    }
}
