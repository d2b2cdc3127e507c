//! HTTP transport for the record store.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | fetch     | POST   | `tables/{table}/records/query` |
//! | get       | POST   | `tables/{table}/records/{id}/query` |
//! | create    | POST   | `tables/{table}/records` |
//! | update    | PUT    | `tables/{table}/records` |
//! | delete    | DELETE | `tables/{table}/records` |
//!
//! Requests carry `Authorization: Bearer <public key>` and, when set,
//! `X-Project-Id`. Without a public key the client reports itself not
//! ready and every call fails with [`ClientError::NotInitialized`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::RecordClient;
use crate::errors::{ClientError, Result};
use crate::models::{
    DeleteParams, DeleteResponse, FetchParams, FetchResponse, GetParams, GetResponse,
    MutateParams, MutateResponse,
};

/// Header carrying the project identifier
pub const PROJECT_ID_HEADER: &str = "X-Project-Id";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: None,
            public_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpRecordClient {
    http: reqwest::Client,
    base_url: Url,
    project_id: Option<String>,
    public_key: Option<String>,
}

impl HttpRecordClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::config(format!("invalid base_url {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::config(format!(
                "base_url {} cannot be used as a base",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            project_id: config.project_id.filter(|p| !p.trim().is_empty()),
            public_key: config.public_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/tables/{table}/records[/{extra}...]` with each segment escaped.
    fn endpoint(&self, table: &str, extra: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ClientError::config("base_url cannot be used as a base"))?;
            segments.pop_if_empty();
            segments.extend(["tables", table, "records"]);
            segments.extend(extra);
        }
        Ok(url)
    }

    async fn send<B, R>(&self, method: Method, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let Some(public_key) = self.public_key.as_deref() else {
            return Err(ClientError::NotInitialized);
        };
        let url_str = url.to_string();

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(public_key)
            .json(body);
        if let Some(project_id) = &self.project_id {
            request = request.header(PROJECT_ID_HEADER, project_id);
        }

        let resp = request.send().await.map_err(|source| ClientError::Http {
            url: url_str.clone(),
            source,
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| ClientError::Http {
            url: url_str.clone(),
            source,
        })?;

        tracing::debug!(
            method = %method,
            url = %url_str,
            status = status.as_u16(),
            "record store call"
        );

        if !status.is_success() {
            return Err(ClientError::Status {
                url: url_str,
                status: status.as_u16(),
                message: error_message(&text).unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                }),
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse {
            url: url_str,
            message: e.to_string(),
        })
    }
}

/// Pull `message` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    Some(from_json.unwrap_or_else(|| body.to_string()))
}

#[async_trait]
impl RecordClient for HttpRecordClient {
    fn is_ready(&self) -> bool {
        self.public_key.is_some()
    }

    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        let url = self.endpoint(table, &["query"])?;
        self.send(Method::POST, url, params).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &GetParams,
    ) -> Result<GetResponse> {
        let id = id.to_string();
        let url = self.endpoint(table, &[id.as_str(), "query"])?;
        self.send(Method::POST, url, params).await
    }

    async fn create_record(&self, table: &str, params: &MutateParams) -> Result<MutateResponse> {
        let url = self.endpoint(table, &[])?;
        self.send(Method::POST, url, params).await
    }

    async fn update_record(&self, table: &str, params: &MutateParams) -> Result<MutateResponse> {
        let url = self.endpoint(table, &[])?;
        self.send(Method::PUT, url, params).await
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<DeleteResponse> {
        let url = self.endpoint(table, &[])?;
        self.send(Method::DELETE, url, params).await
    }
}
