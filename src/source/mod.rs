//! Where the module path and the dependency closure come from
//!
//! - **go_list**: ask the Go toolchain (`go list -m`, `go list -f ... ./...`)
//! - **json_file**: read a precomputed graph file (closure or direct edges)
//!
//! Both are loaded once per invocation; nothing is cached between runs.

pub mod go_list;
pub mod json_file;

pub use go_list::GoListSource;
pub use json_file::JsonGraphSource;

use crate::core::error::AffectedResult;
use crate::graph::DependencyClosure;
use std::path::{Path, PathBuf};

/// A provider of the module path and the package → closure mapping.
pub trait ClosureSource {
  /// Short label used in logs and text output
  fn name(&self) -> &'static str;

  /// Module path used to qualify directory-relative package identifiers
  fn module_root(&self) -> AffectedResult<String>;

  /// Every known package with its flattened dependency closure
  fn closure(&self) -> AffectedResult<DependencyClosure>;

  /// Directory the module path is rooted at (the one holding `go.mod`).
  ///
  /// Package identifiers are `module_root` joined with a file's directory
  /// relative to this one, so changed files must be re-rooted here.
  fn module_dir(&self, cwd: &Path) -> AffectedResult<PathBuf> {
    Ok(find_module_dir(cwd).unwrap_or_else(|| cwd.to_path_buf()))
  }
}

/// Walk up from `start` to the nearest directory containing `go.mod`.
pub fn find_module_dir(start: &Path) -> Option<PathBuf> {
  let mut current = start;

  loop {
    if current.join("go.mod").is_file() {
      return Some(current.to_path_buf());
    }
    current = current.parent()?;
  }
}
