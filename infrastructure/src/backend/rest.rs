//! REST implementation of [`FamilyBackend`].
//!
//! | Operation      | HTTP                                                   |
//! |----------------|--------------------------------------------------------|
//! | search_family  | `GET {base}/api/families/search?query=`                |
//! | get_family     | `GET {base}/api/families/{id}`                         |
//! | search_members | `GET {base}/api/members/search?query=&familyId=`       |
//! | get_member     | `GET {base}/api/members/{id}`                          |
//! | search_events  | `GET {base}/api/events/search?familyId=&query=&from=&to=` |
//! | get_event      | `GET {base}/api/events/{id}`                           |
//!
//! Optional query parameters are only sent when present. The credential, if
//! any, goes out as a bearer token.

use async_trait::async_trait;
use kin_application::ports::family_backend::{BackendError, FamilyBackend};
use kin_domain::util::truncate_str;
use kin_domain::{
    Credential, GetEventArgs, GetFamilyArgs, GetMemberArgs, SearchEventsArgs, SearchFamilyArgs,
    SearchMembersArgs,
};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Error bodies are cut to this many bytes before they reach the model.
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Clone)]
pub struct RestFamilyBackend {
    client: Client,
    base_url: String,
}

impl RestFamilyBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, params = query.len(), "Backend request");

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate_str(body.trim(), MAX_ERROR_BODY).to_string(),
            });
        }
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Collect `(name, value)` pairs for the optional values that are present.
fn present<const N: usize>(
    params: [(&'static str, Option<String>); N],
) -> Vec<(&'static str, String)> {
    params
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
}

#[async_trait]
impl FamilyBackend for RestFamilyBackend {
    async fn search_family(
        &self,
        args: &SearchFamilyArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        self.get(
            "/api/families/search",
            &[("query", args.query.clone())],
            credential,
        )
        .await
    }

    async fn get_family(
        &self,
        args: &GetFamilyArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        self.get(&format!("/api/families/{}", args.family_id), &[], credential)
            .await
    }

    async fn search_members(
        &self,
        args: &SearchMembersArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        let query = present([
            ("query", Some(args.query.clone())),
            ("familyId", args.family_id.map(|id| id.to_string())),
        ]);
        self.get("/api/members/search", &query, credential).await
    }

    async fn get_member(
        &self,
        args: &GetMemberArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        self.get(&format!("/api/members/{}", args.member_id), &[], credential)
            .await
    }

    async fn search_events(
        &self,
        args: &SearchEventsArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        let query = present([
            ("familyId", args.family_id.map(|id| id.to_string())),
            ("query", args.query.clone()),
            ("from", args.from.map(|d| d.format("%Y-%m-%d").to_string())),
            ("to", args.to.map(|d| d.format("%Y-%m-%d").to_string())),
        ]);
        self.get("/api/events/search", &query, credential).await
    }

    async fn get_event(
        &self,
        args: &GetEventArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError> {
        self.get(&format!("/api/events/{}", args.event_id), &[], credential)
            .await
    }
}
