//! Affected package analysis
//!
//! Given a set of changed files, determine:
//! - Which packages directly contain those files (edited)
//! - Which packages transitively depend on an edited package
//! - The union of both, restricted to the packages the closure knows about
//!
//! Because the closure is already flattened, membership is one intersection
//! test per package. No traversal, no fixed point.

use super::closure::{DependencyClosure, PackageId};
use super::resolver::{self, IgnoreRules};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Which set the tool reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
  /// Edited packages plus everything depending on them
  #[default]
  Affected,
  /// Only packages containing a changed file
  Edited,
}

/// What to do with edited packages the closure has no entry for.
///
/// `Drop` keeps membership strictly within the closure's key domain: an edited
/// directory `go list` does not know about (a testdata dir, a package outside
/// `./...`) is not reported. `Include` reports it anyway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPackagePolicy {
  #[default]
  Drop,
  Include,
}

/// Knobs for [`analyze`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
  pub ignore: IgnoreRules,
  pub unknown: UnknownPackagePolicy,
  pub report: ReportMode,
}

/// Set of affected packages from file changes.
#[derive(Debug, Clone, Default)]
pub struct AffectedSet {
  /// Packages directly containing changed files
  pub edited: HashSet<PackageId>,

  /// Packages affected only through their dependencies
  pub dependents: HashSet<PackageId>,

  /// Edited plus dependents (what needs rebuilding/retesting)
  pub affected: HashSet<PackageId>,

  /// Edited packages outside the closure's key domain
  pub unknown: HashSet<PackageId>,
}

/// Complete affected analysis.
#[derive(Debug, Clone)]
pub struct AffectedAnalysis {
  /// Changed files that survived the ignore rules
  pub changed_files: Vec<String>,

  /// Changed files excluded by the ignore rules
  pub ignored_files: Vec<String>,

  /// Impact set
  pub impact: AffectedSet,

  /// Which set [`AffectedAnalysis::reported`] returns
  pub report: ReportMode,
}

impl AffectedAnalysis {
  /// The set selected by the report mode.
  pub fn reported(&self) -> &HashSet<PackageId> {
    match self.report {
      ReportMode::Affected => &self.impact.affected,
      ReportMode::Edited => &self.impact.edited,
    }
  }

  /// The reported set in ascending order.
  pub fn reported_sorted(&self) -> Vec<PackageId> {
    sorted(self.reported())
  }
}

/// Sort a package set for deterministic output.
pub fn sorted(set: &HashSet<PackageId>) -> Vec<PackageId> {
  set.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Is `pkg` edited, or does its closure contain an edited package?
fn is_affected(pkg: &str, deps: &BTreeSet<PackageId>, edited: &HashSet<PackageId>) -> bool {
  edited.contains(pkg) || deps.iter().any(|dep| edited.contains(dep))
}

/// Packages of `closure` that are edited or depend on an edited package.
///
/// Only keys of `closure` can appear in the result. Inputs are not validated;
/// cyclic or inconsistent closures are used as given.
pub fn compute_affected(closure: &DependencyClosure, edited: &HashSet<PackageId>) -> HashSet<PackageId> {
  if edited.is_empty() {
    return HashSet::new();
  }

  closure
    .par_iter()
    .filter(|(pkg, deps)| is_affected(pkg, deps, edited))
    .map(|(pkg, _)| pkg.clone())
    .collect()
}

/// [`compute_affected`], optionally adding edited packages the closure lacks.
pub fn compute_affected_with_policy(
  closure: &DependencyClosure,
  edited: &HashSet<PackageId>,
  policy: UnknownPackagePolicy,
) -> HashSet<PackageId> {
  let mut affected = compute_affected(closure, edited);
  if policy == UnknownPackagePolicy::Include {
    affected.extend(edited.iter().filter(|pkg| !closure.contains(pkg)).cloned());
  }
  affected
}

/// Analyze which packages are affected by file changes.
///
/// Algorithm:
/// 1. Drop ignored files, map the rest to owning packages
/// 2. Test every package's closure against the edited set
/// 3. Apply the unknown-package policy
pub fn analyze<S: AsRef<str>>(
  closure: &DependencyClosure,
  changed_files: &[S],
  module_root: &str,
  options: &AnalysisOptions,
) -> AffectedAnalysis {
  let (kept, ignored) = resolver::partition(changed_files, &options.ignore);
  for file in &ignored {
    tracing::debug!(file = %file, "ignoring changed file");
  }

  let edited = resolver::resolve_edited(&kept, &IgnoreRules::default(), module_root);
  let affected = compute_affected_with_policy(closure, &edited, options.unknown);

  let unknown: HashSet<PackageId> = edited.iter().filter(|pkg| !closure.contains(pkg)).cloned().collect();
  if options.unknown == UnknownPackagePolicy::Drop {
    for pkg in sorted(&unknown) {
      tracing::warn!(package = %pkg, "edited package has no dependency record; not reported");
    }
  }

  let dependents = affected.difference(&edited).cloned().collect();

  tracing::debug!(
    changed = kept.len(),
    ignored = ignored.len(),
    edited = edited.len(),
    affected = affected.len(),
    "affected analysis complete"
  );

  AffectedAnalysis {
    changed_files: kept.into_iter().map(String::from).collect(),
    ignored_files: ignored.into_iter().map(String::from).collect(),
    impact: AffectedSet {
      edited,
      dependents,
      affected,
      unknown,
    },
    report: options.report,
  }
}
