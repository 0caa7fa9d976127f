//! System git backend - zero dependencies
//!
//! Uses `git diff --name-only` for the changed-file list. The range
//! descriptor is handed to git untouched, so anything `git diff` accepts
//! works: `main..HEAD`, `origin/main...`, a single commit, two SHAs.

use crate::core::error::{AffectedError, AffectedResult, GitError, ResultExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> AffectedResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(AffectedError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(AffectedError::message(format!(
        "Failed to open git repository: {}",
        stderr
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Root of the working tree (paths from `git diff` are relative to it)
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Path of `dir` inside the work tree, slash-separated (`""` at the root).
  ///
  /// `None` when `dir` is outside the work tree or cannot be resolved.
  pub fn prefix_of(&self, dir: &Path) -> Option<String> {
    let dir = dir.canonicalize().ok()?;
    let work_tree = self.work_tree.canonicalize().ok()?;
    let rel = dir.strip_prefix(&work_tree).ok()?;
    Some(path_to_git_format(rel))
  }

  /// Files changed in `range`, or in the working tree and index when no
  /// range is given.
  pub fn changed_files(&self, range: Option<&str>) -> AffectedResult<Vec<String>> {
    match range {
      Some(range) => self.diff_names(&[range]),
      None => self.uncommitted_files(),
    }
  }

  /// Files changed in `range` followed by uncommitted changes (working tree
  /// and index), de-duplicated in first-seen order.
  pub fn changed_files_with_worktree(&self, range: &str) -> AffectedResult<Vec<String>> {
    let mut files = self.diff_names(&[range])?;
    files.extend(self.uncommitted_files()?);
    Ok(dedup_preserving_order(files))
  }

  /// Working tree changes, then staged changes
  fn uncommitted_files(&self) -> AffectedResult<Vec<String>> {
    let mut files = self.diff_names(&[])?;
    files.extend(self.diff_names(&["--cached"])?);
    Ok(dedup_preserving_order(files))
  }

  /// `git diff --name-only <args>`, trimmed, blank lines dropped
  fn diff_names(&self, args: &[&str]) -> AffectedResult<Vec<String>> {
    let mut cmd = self.git_cmd();
    cmd.args(["diff", "--name-only"]).args(args);

    let rendered = format!("git diff --name-only {}", args.join(" "));
    tracing::debug!(command = %rendered.trim_end(), "running git");

    let output = cmd.output().context("Failed to run git diff")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(AffectedError::Git(GitError::CommandFailed {
        command: rendered.trim_end().to_string(),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(parse_name_only(&String::from_utf8_lossy(&output.stdout)))
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

/// Split `--name-only` output into paths
fn parse_name_only(stdout: &str) -> Vec<String> {
  stdout
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(String::from)
    .collect()
}

fn dedup_preserving_order(files: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  files.into_iter().filter(|f| seen.insert(f.clone())).collect()
}

/// Convert a path to Git format (always forward slashes)
fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Re-root work-tree-relative paths at `prefix`, dropping files outside it.
///
/// An empty prefix returns the files unchanged.
pub fn strip_prefix(files: Vec<String>, prefix: &str) -> Vec<String> {
  let prefix = prefix.trim_end_matches('/');
  if prefix.is_empty() {
    return files;
  }

  files
    .into_iter()
    .filter_map(|f| {
      f.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(String::from)
    })
    .collect()
}

/// Keep files whose extension is in `extensions` (without the dot).
///
/// An empty list keeps everything.
pub fn filter_by_extension(files: Vec<String>, extensions: &[String]) -> Vec<String> {
  if extensions.is_empty() {
    return files;
  }

  files
    .into_iter()
    .filter(|f| {
      let name = f.rsplit('/').next().unwrap_or(f);
      match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => extensions.iter().any(|e| e == ext),
        _ => false,
      }
    })
    .collect()
}
