//! Package graph analysis
//!
//! Built on a precomputed dependency closure: the resolver turns changed files
//! into edited packages, the affected computation intersects every package's
//! closure with that set.

pub mod affected;
pub mod closure;
pub mod resolver;

pub use affected::{AffectedAnalysis, AnalysisOptions, ReportMode, UnknownPackagePolicy};
pub use closure::{DependencyClosure, PackageId};
pub use resolver::IgnoreRules;
