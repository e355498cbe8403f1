//! OVH account API client.
//!
//! This module provides the `AccountApi` implementation for OVH Public Cloud:
//! - Endpoint aliases (`ovh-eu`, `ovh-ca`, ...) or explicit base URLs
//! - Request signing with application and consumer keys
//! - Server clock synchronization through `/auth/time`

pub mod auth;
pub mod client;

pub use auth::{ApiEndpoint, Credentials};
pub use client::OvhClient;
