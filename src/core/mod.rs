//! Core plumbing for go-affected
//!
//! - **config**: affected.toml discovery, parsing and CLI overrides
//! - **context**: per-invocation module context (module path, closure, config)
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: changed-file discovery through system git

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
