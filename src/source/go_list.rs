//! Dependency closure from the Go toolchain
//!
//! `go list -f '{{.ImportPath}} {{.Deps}}' ./...` prints one line per package
//! in the module, with `.Deps` already being the full transitive dependency
//! list (standard library included), e.g.:
//!
//! ```text
//! example.com/m/pkg/a [errors fmt example.com/m/pkg/b]
//! example.com/m/pkg/b []
//! ```

use super::{ClosureSource, find_module_dir};
use crate::core::error::{AffectedError, AffectedResult, ToolError};
use crate::graph::DependencyClosure;
use std::path::{Path, PathBuf};
use std::process::Command;

const DEPS_TEMPLATE: &str = "{{.ImportPath}} {{.Deps}}";

/// Go toolchain backend
pub struct GoListSource {
  /// Module directory `go` runs in
  dir: PathBuf,

  /// The `go` binary
  go: String,
}

impl GoListSource {
  pub fn new(dir: &Path) -> Self {
    Self {
      dir: dir.to_path_buf(),
      go: "go".to_string(),
    }
  }

  /// Source rooted at the module containing `cwd`.
  ///
  /// `go env GOMOD` names the active `go.mod`; `./...` is then expanded from
  /// its directory so the closure covers the whole module, not just the
  /// packages below `cwd`.
  pub fn locate(cwd: &Path) -> AffectedResult<Self> {
    let probe = Self::new(cwd);
    let gomod = probe.run(&["env", "GOMOD"])?;
    let dir = match module_dir_from_gomod(&gomod) {
      Some(dir) => dir,
      None => {
        tracing::debug!(cwd = %cwd.display(), "go env GOMOD names no module; searching for go.mod");
        find_module_dir(cwd).unwrap_or_else(|| cwd.to_path_buf())
      }
    };

    tracing::debug!(dir = %dir.display(), "located module directory");
    Ok(Self::new(&dir))
  }

  /// Run `go <args>` in the module directory and return stdout.
  fn run(&self, args: &[&str]) -> AffectedResult<String> {
    let rendered = format!("go {}", args.join(" "));
    tracing::debug!(command = %rendered, dir = %self.dir.display(), "running go");

    let output = Command::new(&self.go)
      .current_dir(&self.dir)
      .args(args)
      .output()
      .map_err(|e| {
        AffectedError::Tool(ToolError::NotInstalled {
          tool: self.go.clone(),
          reason: e.to_string(),
        })
      })?;

    if !output.status.success() {
      return Err(AffectedError::Tool(ToolError::CommandFailed {
        command: rendered,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(String::from_utf8(output.stdout)?)
  }
}

impl ClosureSource for GoListSource {
  fn name(&self) -> &'static str {
    "go list"
  }

  fn module_root(&self) -> AffectedResult<String> {
    let stdout = self.run(&["list", "-m"])?;
    Ok(stdout.trim().to_string())
  }

  fn closure(&self) -> AffectedResult<DependencyClosure> {
    let stdout = self.run(&["list", "-f", DEPS_TEMPLATE, "./..."])?;
    let closure = parse_deps_output(&stdout);
    tracing::debug!(packages = closure.len(), "loaded dependency closure from go list");
    Ok(closure)
  }

  fn module_dir(&self, _cwd: &Path) -> AffectedResult<PathBuf> {
    Ok(self.dir.clone())
  }
}

/// Directory of the `go.mod` printed by `go env GOMOD`.
///
/// Outside a module go prints an empty line, or the null device when
/// `GO111MODULE=off`.
fn module_dir_from_gomod(output: &str) -> Option<PathBuf> {
  let gomod = output.trim();
  if gomod.is_empty() || gomod == "/dev/null" || gomod.eq_ignore_ascii_case("NUL") {
    return None;
  }
  Path::new(gomod).parent().map(Path::to_path_buf)
}

/// Parse `{{.ImportPath}} {{.Deps}}` lines.
///
/// Lines without a space-separated dependency part are skipped, the same way
/// a blank trailing line is.
pub fn parse_deps_output(output: &str) -> DependencyClosure {
  let entries = output.lines().filter_map(|line| {
    let (import_path, deps) = line.split_once(' ')?;
    let deps = deps.trim().trim_start_matches('[').trim_end_matches(']');
    Some((import_path, deps.split(' ')))
  });
  DependencyClosure::from_entries(entries)
}
