//! Common utilities and types shared across ovhdeploy crates.
//!
//! This module provides the error taxonomy of a deploy run, the path type
//! used to compose remote object URLs, and the credential wrapper handed to
//! the account API client.

pub mod error;
pub mod types;

pub use error::{Error, Result, UploadFailure};
pub use types::{ObjectPath, Secret};
