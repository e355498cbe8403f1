//! ovhdeploy differential upload engine
//!
//! This module uploads a build output tree to object storage, including:
//! - Storage endpoint lookup through the account API
//! - Optional manifest of previously deployed files (differential deploy)
//! - Concurrent streamed uploads with all-or-nothing outcome
//! - Configuration loading, file discovery and pattern filtering

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod executor;
pub mod manifest;
pub mod plugin;
pub mod request;
pub mod selector;

// Re-export main types
pub use aggregate::aggregate;
pub use config::{ConfigFile, DeployConfig};
pub use discovery::{discover_files, FilePattern};
pub use engine::DeployEngine;
pub use executor::UploadExecutor;
pub use manifest::{ManifestEntries, ManifestResolver};
pub use plugin::{DeployPlugin, UploadClient, UploadReport};
pub use request::{CandidateFiles, UploadPlan, UploadRequest, UploadTarget};
pub use selector::select;
