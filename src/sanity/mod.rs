//! Read-only client for the CMS query API.
//!
//! Queries are opaque GROQ strings sent to
//! `https://{project}.api{.cdn?}.sanity.io/v{version}/data/query/{dataset}`. Parameters are
//! bound as `$name=<json>` query pairs.

pub mod queries;

use crate::config::SanityConfig;
use crate::error::RepositoryError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Envelope around every query result.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse<T> {
    #[serde(default)]
    pub ms: u64,
    #[serde(default)]
    pub query: String,
    pub result: T,
}

#[derive(Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    base_url: Url,
    dataset: String,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(config: &SanityConfig, timeout: Duration) -> Result<Self, RepositoryError> {
        let host = if config.use_cdn { "apicdn" } else { "api" };
        let base_url = Url::parse(&format!(
            "https://{}.{host}.sanity.io/v{}/",
            config.project_id, config.api_version
        ))
        .map_err(|e| RepositoryError::Transport(format!("bad CMS project id: {e}")))?;
        Self::with_base_url(base_url, config, timeout)
    }

    /// Points the client at an arbitrary API root (ending in `/`), e.g. a local test server.
    pub fn with_base_url(base_url: Url, config: &SanityConfig, timeout: Duration) -> Result<Self, RepositoryError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            dataset: config.dataset.clone(),
            token: config.token.clone(),
        })
    }

    pub fn query_url(&self) -> Result<Url, RepositoryError> {
        self.base_url
            .join(&format!("data/query/{}", self.dataset))
            .map_err(|e| RepositoryError::Transport(e.to_string()))
    }

    /// Runs `groq` with the given `$param` bindings and decodes `result` as `T`.
    #[instrument(skip(self, groq, params))]
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, serde_json::Value)],
    ) -> Result<QueryResponse<T>, RepositoryError> {
        let mut url = self.query_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", groq);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        debug!(%url, "Sending query");

        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(format!("dataset {}", self.dataset)));
        }
        if !status.is_success() {
            warn!(%status, "Query failed");
            return Err(RepositoryError::Transport(format!(
                "{status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }
        let envelope: QueryResponse<T> = serde_json::from_slice(&body)?;
        debug!(ms = envelope.ms, "Query answered");
        Ok(envelope)
    }
}
