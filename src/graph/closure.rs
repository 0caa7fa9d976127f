//! Package → transitive dependency closure
//!
//! The closure is the only graph shape the affected computation needs: every
//! package maps to the *flattened* set of packages it depends on, so "does
//! `p` depend on an edited package" is a set intersection, not a traversal.
//!
//! Sources that only know direct edges (hand-written graph files) go through
//! [`DependencyClosure::from_direct_dependencies`], which flattens them with
//! petgraph before anything else sees them.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A package identifier (import path). Ordered lexicographically.
pub type PackageId = String;

/// Flattened dependency closure for every known package.
///
/// Keys are the package domain; values are everything the key transitively
/// depends on. A package with no dependencies maps to the empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyClosure {
  deps: BTreeMap<PackageId, BTreeSet<PackageId>>,
}

impl DependencyClosure {
  /// Build from `(package, closure)` pairs.
  ///
  /// Repeated packages merge their dependency sets. Empty dependency strings
  /// are dropped (`go list` prints `[]` for dependency-free packages).
  pub fn from_entries<I, P, D, S>(entries: I) -> Self
  where
    I: IntoIterator<Item = (P, D)>,
    P: Into<PackageId>,
    D: IntoIterator<Item = S>,
    S: Into<PackageId>,
  {
    let mut deps: BTreeMap<PackageId, BTreeSet<PackageId>> = BTreeMap::new();
    for (pkg, pkg_deps) in entries {
      let set = deps.entry(pkg.into()).or_default();
      set.extend(
        pkg_deps
          .into_iter()
          .map(Into::<PackageId>::into)
          .filter(|d| !d.is_empty()),
      );
    }
    Self { deps }
  }

  /// Flatten a direct-dependency graph into closure form.
  ///
  /// Only packages that appear as keys of `direct` become keys of the result.
  /// Dependencies without their own entry are leaves: they show up inside
  /// closures but are never reported as packages. Cycles are fine; a package
  /// on a cycle ends up in its own closure.
  pub fn from_direct_dependencies<P, D, S>(direct: impl IntoIterator<Item = (P, D)>) -> Self
  where
    P: Into<PackageId>,
    D: IntoIterator<Item = S>,
    S: Into<PackageId>,
  {
    let mut graph: DiGraph<PackageId, ()> = DiGraph::new();
    let mut index: HashMap<PackageId, NodeIndex> = HashMap::new();
    let mut keys: Vec<NodeIndex> = Vec::new();

    let mut node_for = |graph: &mut DiGraph<PackageId, ()>, id: PackageId| -> NodeIndex {
      *index.entry(id.clone()).or_insert_with(|| graph.add_node(id))
    };

    for (pkg, pkg_deps) in direct {
      let from = node_for(&mut graph, pkg.into());
      keys.push(from);
      for dep in pkg_deps {
        let dep: PackageId = dep.into();
        if dep.is_empty() {
          continue;
        }
        let to = node_for(&mut graph, dep);
        graph.update_edge(from, to, ());
      }
    }

    let mut deps: BTreeMap<PackageId, BTreeSet<PackageId>> = BTreeMap::new();
    for start in keys {
      let mut closure = BTreeSet::new();
      for neighbor in graph.neighbors(start) {
        let mut dfs = Dfs::new(&graph, neighbor);
        while let Some(reached) = dfs.next(&graph) {
          closure.insert(graph[reached].clone());
        }
      }
      deps.entry(graph[start].clone()).or_default().extend(closure);
    }

    Self { deps }
  }

  /// Parallel `(package, closure)` pairs, in no particular order.
  pub fn par_iter(&self) -> impl ParallelIterator<Item = (&PackageId, &BTreeSet<PackageId>)> {
    self.deps.par_iter()
  }

  /// Closure of `pkg`, or `None` if `pkg` is not a known package.
  #[allow(dead_code)] // Used in tests
  pub fn dependencies_of(&self, pkg: &str) -> Option<&BTreeSet<PackageId>> {
    self.deps.get(pkg)
  }

  /// Is `pkg` in the key domain?
  pub fn contains(&self, pkg: &str) -> bool {
    self.deps.contains_key(pkg)
  }

  pub fn len(&self) -> usize {
    self.deps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.deps.is_empty()
  }
}
