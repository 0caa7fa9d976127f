//! Dependency closure from a JSON graph file
//!
//! Useful when the Go toolchain is not available where the selection runs
//! (a CI step that only has git), or for non-Go module layouts.
//!
//! ```json
//! {
//!   "module": "example.com/m",
//!   "transitive": true,
//!   "packages": {
//!     "example.com/m/a": [],
//!     "example.com/m/b": ["example.com/m/a"]
//!   }
//! }
//! ```
//!
//! With `"transitive": false` the lists are direct dependencies and get
//! flattened on load.

use super::{ClosureSource, find_module_dir};
use crate::core::error::{AffectedResult, ResultExt};
use crate::graph::{DependencyClosure, PackageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk graph file shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphFile {
  /// Module path prefix for package identifiers
  #[serde(default)]
  pub module: String,

  /// Whether `packages` already holds flattened closures
  #[serde(default = "default_transitive")]
  pub transitive: bool,

  /// Package → dependencies
  #[serde(default)]
  pub packages: BTreeMap<PackageId, Vec<PackageId>>,
}

fn default_transitive() -> bool {
  true
}

impl GraphFile {
  /// Read and parse a graph file
  pub fn load(path: &Path) -> AffectedResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read graph file {}", path.display()))?;
    let graph: GraphFile =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse graph file {}", path.display()))?;
    Ok(graph)
  }

  /// Closure form of this graph
  pub fn to_closure(&self) -> DependencyClosure {
    let entries = self.packages.iter().map(|(pkg, deps)| (pkg.clone(), deps.iter().cloned()));
    if self.transitive {
      DependencyClosure::from_entries(entries)
    } else {
      DependencyClosure::from_direct_dependencies(entries)
    }
  }
}

/// Graph file backend
pub struct JsonGraphSource {
  path: PathBuf,
  graph: GraphFile,
}

impl JsonGraphSource {
  /// Load the file once; `module_root` and `closure` read from memory.
  pub fn open(path: &Path) -> AffectedResult<Self> {
    let graph = GraphFile::load(path)?;
    tracing::debug!(
      path = %path.display(),
      packages = graph.packages.len(),
      transitive = graph.transitive,
      "loaded graph file"
    );
    Ok(Self {
      path: path.to_path_buf(),
      graph,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl ClosureSource for JsonGraphSource {
  fn name(&self) -> &'static str {
    "graph file"
  }

  fn module_root(&self) -> AffectedResult<String> {
    if self.graph.module.is_empty() {
      tracing::warn!(
        path = %self.path().display(),
        "graph file has no module path; packages are plain directories"
      );
    }
    Ok(self.graph.module.clone())
  }

  fn closure(&self) -> AffectedResult<DependencyClosure> {
    Ok(self.graph.to_closure())
  }

  /// The nearest `go.mod` above `cwd`; without one, the graph file's directory.
  fn module_dir(&self, cwd: &Path) -> AffectedResult<PathBuf> {
    if let Some(dir) = find_module_dir(cwd) {
      return Ok(dir);
    }

    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => cwd.to_path_buf(),
    };
    tracing::debug!(dir = %dir.display(), "no go.mod found; using the graph file's directory");
    Ok(dir)
  }
}
