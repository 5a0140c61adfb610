//! GraphQL client.

use serde_json::{json, Value};

use crate::config::ResolvedEnv;
use crate::error::{Error, Result};

use super::{dispatch, merge_headers, Headers, HttpMethod, HttpRequest, RequestSettings, SettingsOverride, Transport};

/// Posts queries and mutations to a single GraphQL endpoint.
pub struct GraphqlClient<T: Transport> {
    transport: T,
    url: String,
    headers: Headers,
    settings: RequestSettings,
    verbose: bool,
}

impl<T: Transport> GraphqlClient<T> {
    /// Creates a client for the given endpoint.
    pub fn new(transport: T, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::Config(
                "GraphQL URL is not defined in the environment configuration".into(),
            ));
        }
        Ok(Self {
            transport,
            url,
            headers: Headers::new(),
            settings: RequestSettings::default(),
            verbose: false,
        })
    }

    /// Creates a client for the GraphQL endpoint of a resolved environment.
    pub fn for_env(transport: T, env: &ResolvedEnv) -> Result<Self> {
        Ok(Self::new(transport, &env.gql_url)?
            .with_headers(env.gql_headers.clone())
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

    /// Sends a query or mutation and returns the full response document.
    ///
    /// GraphQL-level errors arrive in the document's `errors` field and are
    /// left for the caller to assert on.
    pub async fn send_request(&self, query: &str, variables: Value, headers: &Headers) -> Result<Value> {
        let variables = if variables.is_null() { json!({}) } else { variables };
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.url.clone(),
            headers: merge_headers(&self.headers, headers),
            body: json!({ "query": query, "variables": variables }),
            settings: self.settings,
        };
        dispatch(&self.transport, &request, self.verbose).await
    }
}
