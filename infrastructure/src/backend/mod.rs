//! Family backend adapters
//!
//! - `rest`: HTTP client for the family data service

mod rest;

pub use rest::RestFamilyBackend;
