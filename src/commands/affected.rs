//! `go-affected` - Show which packages are affected by changes
//!
//! This command analyzes file changes (via git) and determines:
//! - Which packages directly contain changed files
//! - Which packages transitively depend on those edited packages
//! - The sorted set to rebuild/retest (or only the edited set)

use crate::core::context::ModuleContext;
use crate::core::error::{AffectedError, AffectedResult};
use crate::core::vcs::{SystemGit, filter_by_extension, strip_prefix};
use crate::graph::affected;
use crate::graph::{AffectedAnalysis, ReportMode};
use std::io::{self, Write};

/// Output format for affected command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  pub fn from_str(s: &str) -> AffectedResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(AffectedError::message(format!(
        "Unknown format '{}'. Valid formats: names, text, json",
        s
      ))),
    }
  }
}

/// Where the changed files come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRange {
  /// A range descriptor passed to `git diff` as-is
  pub range: Option<String>,
  /// Also include working tree and index changes when a range is given
  pub uncommitted: bool,
}

impl ChangeRange {
  /// Resolve the CLI's range forms into one descriptor.
  ///
  /// `range` wins, then `--from/--to` (`from..to`, `to` defaulting to HEAD),
  /// then `--since` (`since..HEAD`). None of them means uncommitted changes.
  pub fn from_args(range: Option<String>, since: Option<String>, from: Option<String>, to: Option<String>) -> Self {
    let range = range.or_else(|| match (from, to) {
      (Some(from), Some(to)) => Some(format!("{}..{}", from, to)),
      (Some(from), None) => Some(format!("{}..HEAD", from)),
      (None, _) => since.map(|since| format!("{}..HEAD", since)),
    });

    Self {
      range,
      uncommitted: false,
    }
  }

  pub fn describe(&self) -> String {
    match (&self.range, self.uncommitted) {
      (Some(range), false) => range.clone(),
      (Some(range), true) => format!("{} + uncommitted changes", range),
      (None, _) => "uncommitted changes".to_string(),
    }
  }
}

/// Run the affected command
pub fn run_affected(ctx: &ModuleContext, changes: &ChangeRange, format: &str, dry_run: bool) -> AffectedResult<()> {
  let output_format = OutputFormat::from_str(format)?;

  let changed_files = get_changed_files(ctx, changes)?;

  if dry_run {
    println!(
      "DRY RUN: Would analyze {} changed files ({})",
      changed_files.len(),
      changes.describe()
    );
    for file in &changed_files {
      println!("  - {}", file);
    }
    return Ok(());
  }

  let analysis = affected::analyze(
    &ctx.closure,
    &changed_files,
    &ctx.module_root,
    &ctx.config.analysis_options(),
  );

  let stdout = io::stdout();
  let mut out = stdout.lock();
  display_results(&mut out, ctx, changes, &analysis, output_format)?;
  out.flush()?;

  Ok(())
}

/// Get changed files from git, relative to the module directory and
/// filtered by the configured extensions
fn get_changed_files(ctx: &ModuleContext, changes: &ChangeRange) -> AffectedResult<Vec<String>> {
  let git = SystemGit::open(ctx.workspace_root())?;

  let files = match (&changes.range, changes.uncommitted) {
    (Some(range), true) => git.changed_files_with_worktree(range)?,
    (range, _) => git.changed_files(range.as_deref())?,
  };

  // git reports paths from the work tree root; package paths start at go.mod
  let files = match git.prefix_of(&ctx.module_dir) {
    Some(prefix) => strip_prefix(files, &prefix),
    None => {
      tracing::warn!(
        dir = %ctx.module_dir.display(),
        work_tree = %git.work_tree().display(),
        "could not place module directory inside the work tree; using paths as reported by git"
      );
      files
    }
  };

  let total = files.len();
  let files = filter_by_extension(files, &ctx.config.extensions);
  tracing::debug!(
    total,
    kept = files.len(),
    extensions = ?ctx.config.extensions,
    "filtered changed files by extension"
  );

  Ok(files)
}

/// Display affected analysis results
pub fn display_results(
  out: &mut impl Write,
  ctx: &ModuleContext,
  changes: &ChangeRange,
  analysis: &AffectedAnalysis,
  format: OutputFormat,
) -> AffectedResult<()> {
  match format {
    OutputFormat::Text => display_text(out, ctx, changes, analysis),
    OutputFormat::Json => display_json(out, ctx, changes, analysis),
    OutputFormat::NamesOnly => display_names_only(out, analysis),
  }
}

/// Display results in human-readable text format
fn display_text(
  out: &mut impl Write,
  ctx: &ModuleContext,
  changes: &ChangeRange,
  analysis: &AffectedAnalysis,
) -> AffectedResult<()> {
  writeln!(out, "Affected Analysis")?;
  writeln!(out, "=================")?;
  writeln!(out)?;
  writeln!(out, "Module: {} ({} packages via {})", ctx.module_root, ctx.closure.len(), ctx.source_name)?;
  writeln!(out, "Changes: {}", changes.describe())?;
  writeln!(out)?;

  writeln!(out, "Changed files: {}", analysis.changed_files.len())?;
  if !analysis.changed_files.is_empty() && analysis.changed_files.len() <= 20 {
    for file in &analysis.changed_files {
      writeln!(out, "  {}", file)?;
    }
    writeln!(out)?;
  }

  if !analysis.ignored_files.is_empty() {
    writeln!(out, "Ignored files: {}", analysis.ignored_files.len())?;
    writeln!(out)?;
  }

  let edited = affected::sorted(&analysis.impact.edited);
  let dependents = affected::sorted(&analysis.impact.dependents);
  let unknown = affected::sorted(&analysis.impact.unknown);
  let reported = analysis.reported_sorted();

  writeln!(out, "Edited: {} packages", edited.len())?;
  for pkg in &edited {
    writeln!(out, "  📦 {}", pkg)?;
  }
  writeln!(out)?;

  writeln!(out, "Transitive dependents: {} packages", dependents.len())?;
  for pkg in &dependents {
    writeln!(out, "  ⬆  {}", pkg)?;
  }
  writeln!(out)?;

  if !unknown.is_empty() {
    writeln!(out, "Edited without dependency record: {} packages", unknown.len())?;
    for pkg in &unknown {
      writeln!(out, "  ?  {}", pkg)?;
    }
    writeln!(out)?;
  }

  writeln!(out, "Reported ({}): {} packages", report_label(analysis), reported.len())?;
  for pkg in &reported {
    writeln!(out, "  🎯 {}", pkg)?;
  }

  Ok(())
}

/// Display results in JSON format
fn display_json(
  out: &mut impl Write,
  ctx: &ModuleContext,
  changes: &ChangeRange,
  analysis: &AffectedAnalysis,
) -> AffectedResult<()> {
  use serde_json::json;

  let edited = affected::sorted(&analysis.impact.edited);
  let dependents = affected::sorted(&analysis.impact.dependents);
  let unknown = affected::sorted(&analysis.impact.unknown);
  let reported = analysis.reported_sorted();

  let output = json!({
      "module": ctx.module_root,
      "range": changes.range,
      "uncommitted": changes.uncommitted || changes.range.is_none(),
      "changed_files": analysis.changed_files,
      "ignored_files": analysis.ignored_files,
      "impact": {
          "edited": edited,
          "dependents": dependents,
          "unknown": unknown,
      },
      "report": report_label(analysis),
      "packages": reported,
      "summary": {
          "changed_files_count": analysis.changed_files.len(),
          "ignored_files_count": analysis.ignored_files.len(),
          "edited_count": edited.len(),
          "dependents_count": dependents.len(),
          "packages_count": reported.len()
      }
  });

  writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;

  Ok(())
}

/// Display only package names, one per line
fn display_names_only(out: &mut impl Write, analysis: &AffectedAnalysis) -> AffectedResult<()> {
  for pkg in analysis.reported_sorted() {
    writeln!(out, "{}", pkg)?;
  }

  Ok(())
}

fn report_label(analysis: &AffectedAnalysis) -> &'static str {
  match analysis.report {
    ReportMode::Affected => "affected",
    ReportMode::Edited => "edited",
  }
}
