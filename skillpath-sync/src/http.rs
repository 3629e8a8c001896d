//! HTTP implementation of the remote API.
//!
//! One REST-ish endpoint per collection:
//! `POST /api/{collection}` (create), `PUT /api/{collection}/{id}`
//! (update), `DELETE /api/{collection}/{id}` (delete), and
//! `GET /api/{collection}` for bulk pulls.

use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteApi;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use skillpath_types::{EntityKind, MutationAction, MutationPayload};
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRemoteConfig {
    /// Base URL of the sync backend (e.g. `https://api.skillpath.app`).
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for HttpRemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.skillpath.app".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Remote API over HTTP.
pub struct HttpRemoteApi {
    config: HttpRemoteConfig,
    client: Client,
}

impl HttpRemoteApi {
    /// Creates an HTTP remote with the given configuration.
    pub fn new(config: HttpRemoteConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to create HTTP client");
        Self { config, client }
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/api/{}", self.config.base_url, kind.collection())
    }

    fn record_url(&self, kind: EntityKind, id: &str) -> String {
        format!("{}/api/{}/{}", self.config.base_url, kind.collection(), id)
    }
}

fn map_request_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Network(e.to_string())
    }
}

fn check_status(status: StatusCode) -> SyncResult<()> {
    if status.is_success() {
        Ok(())
    } else if status.is_server_error() {
        Err(SyncError::Network(format!("server error: {status}")))
    } else {
        Err(SyncError::Rejected {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string(),
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn submit(&self, action: MutationAction, payload: &MutationPayload) -> SyncResult<()> {
        let kind = payload.kind();
        let id = payload.record_id().to_string();

        let response = match action {
            MutationAction::Create => {
                let body = payload.record_value()?;
                self.client
                    .post(self.collection_url(kind))
                    .json(&body)
                    .send()
                    .await
            }
            MutationAction::Update => {
                let body = payload.record_value()?;
                self.client
                    .put(self.record_url(kind, &id))
                    .json(&body)
                    .send()
                    .await
            }
            MutationAction::Delete => {
                self.client.delete(self.record_url(kind, &id)).send().await
            }
        }
        .map_err(map_request_error)?;

        debug!(%kind, %action, %id, status = %response.status(), "submitted mutation");
        check_status(response.status())
    }

    async fn pull_all(&self, kinds: &[EntityKind]) -> SyncResult<Vec<MutationPayload>> {
        let mut payloads = Vec::new();
        for &kind in kinds {
            let response = self
                .client
                .get(self.collection_url(kind))
                .send()
                .await
                .map_err(map_request_error)?;
            check_status(response.status())?;

            let values: Vec<serde_json::Value> =
                response.json().await.map_err(map_request_error)?;
            debug!(%kind, count = values.len(), "pulled records");
            for value in values {
                payloads.push(MutationPayload::from_kind_value(kind, value)?);
            }
        }
        Ok(payloads)
    }
}
