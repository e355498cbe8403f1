//! Object storage access for ovhdeploy.
//!
//! This module provides a trait-based interface to the object storage a
//! deploy writes to, the account API used to obtain a storage token, and
//! the locator that turns a project/region pair into a usable endpoint.
//!
//! # Design Principles
//! - Backend isolation: the deploy engine only sees `ObjectStore` and `AccountApi`
//! - Async operations: all I/O operations are async
//! - Streaming support: uploads are streamed from disk
//! - Status codes are surfaced, not interpreted: callers decide what counts as success

pub mod account;
pub mod locator;
pub mod memory;
pub mod ovh;
pub mod store;
pub mod swift;

pub use account::{AccountApi, AccountApiError, RegionEndpoint, StorageAccess};
pub use locator::{StorageEndpoint, StorageLocator};
pub use memory::MemoryStore;
pub use ovh::{ApiEndpoint, Credentials, OvhClient};
pub use store::{ByteStream, ObjectResponse, ObjectStore};
pub use swift::SwiftClient;
