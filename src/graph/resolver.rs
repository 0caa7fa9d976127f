//! Changed files → edited packages
//!
//! A Go package is a directory, so the package that owns a file is simply the
//! file's directory qualified with the module path. No lookup against the
//! dependency graph happens here; files in directories that are not packages
//! produce identifiers the affected computation will never match.

use super::closure::PackageId;
use crate::utils::{join_slash_path, slash_dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Path substrings that exclude a changed file from consideration.
///
/// Matching is plain, case-sensitive substring containment: `.checkout_git`
/// excludes `a/.checkout_git/b.go` and `x.checkout_gitty/c.go` alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreRules {
  patterns: Vec<String>,
}

impl IgnoreRules {
  pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      patterns: patterns
        .into_iter()
        .map(Into::<String>::into)
        .filter(|p| !p.is_empty())
        .collect(),
    }
  }

  /// Parse a comma-separated list. Empty segments are dropped, so `""`
  /// yields the empty rule set.
  pub fn parse(list: &str) -> Self {
    Self::new(list.split(','))
  }

  /// Does any rule occur in `path`?
  pub fn is_ignored(&self, path: &str) -> bool {
    self.patterns.iter().any(|p| path.contains(p.as_str()))
  }

  pub fn patterns(&self) -> &[String] {
    &self.patterns
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }
}

/// Split changed files into `(kept, ignored)`, preserving input order.
pub fn partition<'a, S: AsRef<str>>(changed_files: &'a [S], rules: &IgnoreRules) -> (Vec<&'a str>, Vec<&'a str>) {
  if rules.is_empty() {
    return (changed_files.iter().map(|f| f.as_ref()).collect(), Vec::new());
  }

  changed_files
    .iter()
    .map(|f| f.as_ref())
    .partition(|f| !rules.is_ignored(f))
}

/// Package that owns `file`: the directory of `module_root/file`.
pub fn package_of(module_root: &str, file: &str) -> PackageId {
  slash_dir(&join_slash_path(module_root, file))
}

/// Map changed files to the set of packages they live in.
///
/// Files matching an ignore rule are dropped first. An empty input yields an
/// empty set.
pub fn resolve_edited<S: AsRef<str>>(changed_files: &[S], rules: &IgnoreRules, module_root: &str) -> HashSet<PackageId> {
  changed_files
    .iter()
    .map(|f| f.as_ref())
    .filter(|f| !rules.is_ignored(f))
    .map(|f| package_of(module_root, f))
    .collect()
}
