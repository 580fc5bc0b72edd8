// ============================================================================
// Library Infrastructure - Campus Identity Client
// File: crates/library-infrastructure/src/gateway/campus_client.rs
// ============================================================================
//! HTTP client for the campus identity API.
//!
//! One `POST {base_url}/oauth/login` per lookup and one `GET` of the
//! directory per listing, bounded by the configured timeout. No retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use library_core::domain::ExternalIdentity;
use library_core::error::GatewayError;
use library_core::gateway::IdentityGateway;
use library_shared::config::CampusSettings;
use library_shared::constants::CAMPUS_DIRECTORY_PATH;
use library_shared::utils::{looks_like_email, mask_email};

#[derive(Debug, Deserialize)]
struct CampusEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<CampusData>,
}

#[derive(Debug, Deserialize)]
struct CampusData {
    #[serde(default)]
    user: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<DirectoryData>,
}

/// The directory comes back either as a bare array or wrapped in `users`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DirectoryData {
    List(Vec<serde_json::Value>),
    Wrapped { users: Vec<serde_json::Value> },
}

impl DirectoryData {
    fn into_entries(self) -> Vec<serde_json::Value> {
        match self {
            DirectoryData::List(entries) | DirectoryData::Wrapped { users: entries } => entries,
        }
    }
}

pub struct CampusGateway {
    http: Client,
    base_url: Option<String>,
}

impl CampusGateway {
    pub fn new(settings: &CampusSettings) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("library-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let base_url = settings
            .configured_base_url()
            .map(|url| url.trim_end_matches('/').to_string());
        if base_url.is_none() {
            warn!("Campus API base URL is not configured; lookups will fail");
        }

        Ok(Self { http, base_url })
    }

    fn classify(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            error!("Campus API request timeout");
            GatewayError::UpstreamTimeout
        } else {
            error!("Campus API exception: {}", err);
            GatewayError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl IdentityGateway for CampusGateway {
    async fn lookup(&self, email: &str) -> Result<ExternalIdentity, GatewayError> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(GatewayError::InvalidInput);
        }
        let base_url = self.base_url.as_deref().ok_or(GatewayError::Unconfigured)?;

        debug!(email = %mask_email(email), "Looking up campus identity");

        let response = self
            .http
            .post(format!("{}/oauth/login", base_url))
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "Campus API error status");
            return Err(GatewayError::UpstreamError { status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(Self::classify)?;
        let envelope: CampusEnvelope = serde_json::from_slice(&body).map_err(|e| {
            error!("Campus API returned an unparsable body: {}", e);
            GatewayError::Transport(format!("invalid response body: {}", e))
        })?;

        let user = match envelope {
            CampusEnvelope { success: true, data: Some(CampusData { user: Some(user) }) } => user,
            _ => {
                warn!(email = %mask_email(email), "User not found or invalid response");
                return Err(GatewayError::NotFound);
            }
        };

        let identity: ExternalIdentity = serde_json::from_value(user).map_err(|e| {
            warn!("Campus user record has an unexpected shape: {}", e);
            GatewayError::NotFound
        })?;

        info!(email = %mask_email(&identity.email), role = %identity.role, "User found in Campus API");
        Ok(identity)
    }

    async fn list_identities(&self) -> Result<Vec<ExternalIdentity>, GatewayError> {
        let base_url = self.base_url.as_deref().ok_or(GatewayError::Unconfigured)?;

        let response = self
            .http
            .get(format!("{}{}", base_url, CAMPUS_DIRECTORY_PATH))
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "Campus API error status");
            return Err(GatewayError::UpstreamError { status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(Self::classify)?;
        let envelope: DirectoryEnvelope = serde_json::from_slice(&body).map_err(|e| {
            error!("Campus API returned an unparsable directory: {}", e);
            GatewayError::Transport(format!("invalid response body: {}", e))
        })?;

        let entries = match envelope {
            DirectoryEnvelope { success: true, data: Some(data), .. } => data.into_entries(),
            DirectoryEnvelope { message, .. } => {
                let message = message.unwrap_or_else(|| "directory unavailable".into());
                error!("Campus API refused the directory request: {}", message);
                return Err(GatewayError::Transport(message));
            }
        };

        let total = entries.len();
        let people: Vec<ExternalIdentity> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<ExternalIdentity>(entry).ok())
            .filter(|identity| looks_like_email(identity.email.trim()))
            .collect();
        if people.len() < total {
            warn!(skipped = total - people.len(), "Skipped malformed campus directory entries");
        }

        info!(count = people.len(), "Campus directory fetched");
        Ok(people)
    }
}
