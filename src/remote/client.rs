//! PostgREST Client
//!
//! HTTP client for the hosted table store (Supabase exposes its tables
//! through PostgREST under `/rest/v1`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use super::error::{RemoteError, RemoteResult};
use super::query::SelectQuery;
use super::DataStore;
use crate::config::RemoteConfig;

/// REST client for the remote store
pub struct RestClient {
    client: Client,
    config: RemoteConfig,
}

impl RestClient {
    /// Create the client.
    ///
    /// A missing endpoint or key is not an error: a warning is logged and
    /// every call will fail once it is actually made.
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        if !config.is_complete() {
            tracing::warn!(
                url_set = !config.url.is_empty(),
                key_set = !config.anon_key.is_empty(),
                "Missing remote store configuration: OKR_SUPABASE_URL / OKR_SUPABASE_ANON_KEY"
            );
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
    }

    async fn read_rows(table: &str, response: Response) -> RemoteResult<Vec<Value>> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            if body.trim().is_empty() {
                return Ok(Vec::new());
            }
            serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
                table: table.to_string(),
                error: e.to_string(),
            })
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            tracing::warn!(table, status = status.as_u16(), %message, "Remote store rejected request");
            Err(RemoteError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl DataStore for RestClient {
    fn backend_tag(&self) -> &'static str {
        "postgrest"
    }

    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn select(&self, query: &SelectQuery) -> RemoteResult<Vec<Value>> {
        let request = self
            .client
            .get(self.table_url(&query.table))
            .query(&query.to_params());

        let response = self.authorized(request).send().await.map_err(map_send_error)?;
        Self::read_rows(&query.table, response).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> RemoteResult<Vec<Value>> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);

        let response = self.authorized(request).send().await.map_err(map_send_error)?;
        Self::read_rows(table, response).await
    }
}

fn map_send_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Request(e)
    }
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pull the human-readable message out of an error response body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .message
            .or(parsed.msg)
            .or(parsed.error)
            .unwrap_or_default(),
        Err(_) => body.trim().to_string(),
    }
}
