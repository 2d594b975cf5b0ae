//! # 1Password Connect Client
//!
//! REST client for a 1Password Connect server. Implements [`VaultLookup`]
//! so the resolver and item retrieval helpers can run against a live
//! Connect deployment.
//!
//! Raw API error bodies are never surfaced; every failure is mapped to a
//! [`ConnectError`] variant.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::lookup::{Item, VaultItemCandidate, VaultLookup};
use crate::observability::metrics;

/// 1Password Connect API errors
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("network error communicating with 1Password Connect")]
    Network(#[source] reqwest::Error),

    #[error("invalid response body from 1Password Connect")]
    Decode(#[source] reqwest::Error),

    #[error("1Password Connect authentication failed (check bearer token)")]
    Unauthorized,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("1Password Connect server error (status {0})")]
    ServerError(u16),

    #[error("unexpected 1Password Connect response: status {0}")]
    UnexpectedStatus(u16),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultSummary {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
}

/// 1Password Connect REST API client
#[derive(Debug, Clone)]
pub struct ConnectClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ConnectClient {
    fn user_agent() -> String {
        format!("onepassword-operator/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Create a new client pointing at the given Connect server URL
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ConnectError> {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(ConnectError::Network)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
        not_found: impl FnOnce() -> String,
    ) -> Result<T, ConnectError> {
        let start = Instant::now();
        let result = self.send(path, query, not_found).await;
        metrics::observe_connect_request(operation, start.elapsed().as_secs_f64());

        match result {
            Ok(resp) => resp.json::<T>().await.map_err(|e| {
                metrics::increment_connect_errors(operation);
                ConnectError::Decode(e)
            }),
            Err(e) => {
                metrics::increment_connect_errors(operation);
                Err(e)
            }
        }
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: impl FnOnce() -> String,
    ) -> Result<reqwest::Response, ConnectError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Calling 1Password Connect");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(ConnectError::Network)?;

        match resp.status() {
            StatusCode::OK => Ok(resp),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ConnectError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ConnectError::NotFound(not_found())),
            status if status.is_server_error() => Err(ConnectError::ServerError(status.as_u16())),
            status => Err(ConnectError::UnexpectedStatus(status.as_u16())),
        }
    }
}

fn title_filter(attribute: &str, title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{attribute} eq \"{escaped}\"")
}

#[async_trait]
impl VaultLookup for ConnectClient {
    async fn vaults_by_title(&self, title: &str) -> Result<Vec<VaultItemCandidate>, ConnectError> {
        let vaults: Vec<VaultSummary> = self
            .get_json(
                "list_vaults",
                "/v1/vaults",
                &[("filter", title_filter("name", title))],
                || "vaults endpoint".to_string(),
            )
            .await?;

        Ok(vaults
            .into_iter()
            .map(|v| VaultItemCandidate {
                id: v.id,
                title: v.name,
                created_at: v.created_at,
            })
            .collect())
    }

    async fn items_by_title(
        &self,
        title: &str,
        vault_id: &str,
    ) -> Result<Vec<VaultItemCandidate>, ConnectError> {
        let items: Vec<ItemSummary> = self
            .get_json(
                "list_items",
                &format!("/v1/vaults/{vault_id}/items"),
                &[("filter", title_filter("title", title))],
                || format!("vault {vault_id}"),
            )
            .await?;

        Ok(items
            .into_iter()
            .map(|i| VaultItemCandidate {
                id: i.id,
                title: i.title,
                created_at: i.created_at,
            })
            .collect())
    }

    async fn get_item(&self, item_id: &str, vault_id: &str) -> Result<Item, ConnectError> {
        self.get_json(
            "get_item",
            &format!("/v1/vaults/{vault_id}/items/{item_id}"),
            &[],
            || format!("item {item_id} in vault {vault_id}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            ConnectClient::new("http://localhost:8080/", "token", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_user_agent_contains_version() {
        assert!(ConnectClient::user_agent().starts_with("onepassword-operator/"));
    }

    #[test]
    fn test_title_filter_escapes_quotes() {
        assert_eq!(title_filter("title", "plain"), "title eq \"plain\"");
        assert_eq!(title_filter("name", "a\"b"), "name eq \"a\\\"b\"");
    }

    #[test]
    fn test_title_filter_escapes_backslashes_first() {
        assert_eq!(title_filter("title", "dir\\"), "title eq \"dir\\\\\"");
        assert_eq!(title_filter("title", "a\\\"b"), "title eq \"a\\\\\\\"b\"");
    }

    #[test]
    fn test_connect_error_display() {
        assert!(ConnectError::Unauthorized
            .to_string()
            .contains("authentication failed"));
        assert!(ConnectError::NotFound("vault x".into())
            .to_string()
            .contains("vault x"));
        assert!(ConnectError::ServerError(503).to_string().contains("503"));
        assert!(ConnectError::UnexpectedStatus(418).to_string().contains("418"));
    }

    #[test]
    fn test_vault_summary_deserialize() {
        let vault: VaultSummary = serde_json::from_str(
            r#"{"id":"v1","name":"Personal","createdAt":"2021-04-10T17:20:05Z","items":3}"#,
        )
        .unwrap();
        assert_eq!(vault.id, "v1");
        assert_eq!(vault.name, "Personal");
    }
}
