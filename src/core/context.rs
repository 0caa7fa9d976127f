//! Module context - build once, pass everywhere
//!
//! Everything the affected analysis consumes from the outside world (the
//! module path, the dependency closure, the resolved configuration) is loaded
//! here exactly once per invocation and then passed by reference.
//!
//! ```text
//! main.rs:
//!   ModuleContext::build() -> &ModuleContext
//!   |
//!   v
//! commands/affected.rs:
//!   fn run_affected(ctx: &ModuleContext, ...)
//! ```

use crate::core::config::AffectedConfig;
use crate::core::error::AffectedResult;
use crate::graph::DependencyClosure;
use crate::source::{ClosureSource, GoListSource, JsonGraphSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared, immutable inputs for one invocation.
#[derive(Clone)]
pub struct ModuleContext {
  /// Directory go-affected was invoked from
  pub root: PathBuf,

  /// Directory holding go.mod; changed files are re-rooted here
  pub module_dir: PathBuf,

  /// Resolved configuration (file + CLI overrides)
  pub config: Arc<AffectedConfig>,

  /// Module path used to qualify package directories
  pub module_root: String,

  /// Package → transitive dependencies
  /// Wrapped in Arc for cheap sharing
  pub closure: Arc<DependencyClosure>,

  /// Label of the source the closure came from
  pub source_name: &'static str,
}

impl ModuleContext {
  /// Build the context from a module directory and resolved config.
  ///
  /// Uses the JSON graph file when one is configured, `go list` otherwise.
  pub fn build(root: &Path, config: AffectedConfig) -> AffectedResult<Self> {
    let source: Box<dyn ClosureSource> = match &config.graph {
      Some(path) => {
        let path = if path.is_absolute() { path.clone() } else { root.join(path) };
        Box::new(JsonGraphSource::open(&path)?)
      }
      None => Box::new(GoListSource::locate(root)?),
    };

    Self::from_source(root, config, source.as_ref())
  }

  /// Build the context from an explicit source.
  pub fn from_source(root: &Path, config: AffectedConfig, source: &dyn ClosureSource) -> AffectedResult<Self> {
    let module_dir = source.module_dir(root)?;
    let module_root = source.module_root()?;
    let closure = source.closure()?;
    if closure.is_empty() {
      tracing::warn!(source = source.name(), "dependency closure is empty; nothing can be reported");
    }

    tracing::info!(
      source = source.name(),
      module = %module_root,
      dir = %module_dir.display(),
      packages = closure.len(),
      "module context ready"
    );

    Ok(Self {
      root: root.to_path_buf(),
      module_dir,
      config: Arc::new(config),
      module_root,
      closure: Arc::new(closure),
      source_name: source.name(),
    })
  }

  /// Get the invocation directory as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
