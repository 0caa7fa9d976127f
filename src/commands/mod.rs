//! CLI commands for go-affected
//!
//! - **affected**: find packages affected by a change range and print them
//!
//! Commands accept `&ModuleContext` so the dependency closure is loaded once.

pub mod affected;

pub use affected::{ChangeRange, run_affected};
