//! Family backend port
//!
//! The domain data service (families, members, events) is an external
//! collaborator. Each operation corresponds 1:1 to a catalog tool and returns
//! the backend's JSON unchanged.

use async_trait::async_trait;
use kin_domain::{
    Credential, GetEventArgs, GetFamilyArgs, GetMemberArgs, SearchEventsArgs, SearchFamilyArgs,
    SearchMembersArgs,
};
use thiserror::Error;

/// Errors that can occur while talking to the family backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned an unreadable body: {0}")]
    Decode(String),
}

/// Read operations of the family backend.
///
/// `credential` is forwarded as a bearer token when present. Whether an
/// operation may be called without one is decided by the tool executor, not
/// by implementations.
#[async_trait]
pub trait FamilyBackend: Send + Sync {
    async fn search_family(
        &self,
        args: &SearchFamilyArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError>;

    async fn get_family(
        &self,
        args: &GetFamilyArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError>;

    async fn search_members(
        &self,
        args: &SearchMembersArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError>;

    async fn get_member(
        &self,
        args: &GetMemberArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError>;

    async fn search_events(
        &self,
        args: &SearchEventsArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError>;

    async fn get_event(
        &self,
        args: &GetEventArgs,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, BackendError>;
}
