//! Core domain concepts shared across all subdomains.
//!
//! - [`credential::Credential`]: bearer token forwarded to protected tools
//! - [`error::DomainError`]: domain-level errors

pub mod credential;
pub mod error;
