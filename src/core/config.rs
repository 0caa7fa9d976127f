use crate::core::error::{AffectedError, AffectedResult, ConfigError, ResultExt};
use crate::graph::{AnalysisOptions, IgnoreRules, ReportMode, UnknownPackagePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default ignore rule: scratch checkouts some CI setups leave in the tree
pub const DEFAULT_IGNORE: &str = ".checkout_git";

/// Configuration for go-affected
/// Searched in order: affected.toml, .affected.toml, .config/affected.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AffectedConfig {
  /// Path substrings that exclude a changed file
  #[serde(default = "default_ignore")]
  pub ignore: Vec<String>,

  /// Extensions (without the dot) a changed file must have to count.
  /// Empty = every file counts.
  #[serde(default = "default_extensions")]
  pub extensions: Vec<String>,

  /// Which set to report
  #[serde(default)]
  pub report: ReportMode,

  /// Report edited packages that have no dependency record
  #[serde(default)]
  pub include_unknown: bool,

  /// Precomputed JSON graph to use instead of `go list`
  /// (relative paths resolve against the config file's directory)
  #[serde(default)]
  pub graph: Option<PathBuf>,
}

fn default_ignore() -> Vec<String> {
  vec![DEFAULT_IGNORE.to_string()]
}

fn default_extensions() -> Vec<String> {
  vec!["go".to_string()]
}

impl Default for AffectedConfig {
  fn default() -> Self {
    Self {
      ignore: default_ignore(),
      extensions: default_extensions(),
      report: ReportMode::default(),
      include_unknown: false,
      graph: None,
    }
  }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  /// Comma-separated ignore list (`""` disables ignoring)
  pub ignore_dirs: Option<String>,
  /// Comma-separated extension list (`""` keeps every file)
  pub extensions: Option<String>,
  pub edited_only: bool,
  pub include_unknown: bool,
  pub graph: Option<PathBuf>,
}

impl AffectedConfig {
  /// Find config file in search order: affected.toml, .affected.toml, .config/affected.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("affected.toml"),
      path.join(".affected.toml"),
      path.join(".config").join("affected.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit file, or discover one under `root`.
  ///
  /// No file found during discovery means defaults; an explicit path that
  /// does not exist is an error.
  pub fn load(root: &Path, explicit: Option<&Path>) -> AffectedResult<Self> {
    let config_path = match explicit {
      Some(path) => {
        if !path.exists() {
          return Err(AffectedError::Config(ConfigError::NotFound {
            path: path.to_path_buf(),
          }));
        }
        path.to_path_buf()
      }
      None => match Self::find_config_path(root) {
        Some(path) => path,
        None => {
          tracing::debug!(root = %root.display(), "no config file found; using defaults");
          return Ok(Self::default());
        }
      },
    };

    let mut config = Self::load_file(&config_path)?;
    if let Some(graph) = config.graph.take() {
      let base = config_path.parent().unwrap_or(root);
      config.graph = Some(base.join(graph));
    }
    Ok(config)
  }

  /// Parse a single config file
  pub fn load_file(config_path: &Path) -> AffectedResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: AffectedConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
  }

  /// Apply command-line overrides on top of file values
  pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
    if let Some(ignore) = &overrides.ignore_dirs {
      self.ignore = IgnoreRules::parse(ignore).patterns().to_vec();
    }
    if let Some(extensions) = &overrides.extensions {
      self.extensions = split_list(extensions);
    }
    if overrides.edited_only {
      self.report = ReportMode::Edited;
    }
    if overrides.include_unknown {
      self.include_unknown = true;
    }
    if let Some(graph) = &overrides.graph {
      self.graph = Some(graph.clone());
    }
    self
  }

  /// Reject values that would silently match the wrong files
  pub fn validate(self) -> AffectedResult<Self> {
    for ext in &self.extensions {
      if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
        return Err(AffectedError::Config(ConfigError::InvalidValue {
          field: "extensions".to_string(),
          value: ext.clone(),
          expected: "a bare file extension such as \"go\" (no leading dot)".to_string(),
        }));
      }
    }
    for pattern in &self.ignore {
      if pattern.is_empty() {
        return Err(AffectedError::Config(ConfigError::InvalidValue {
          field: "ignore".to_string(),
          value: pattern.clone(),
          expected: "a non-empty path substring (an empty one matches every file)".to_string(),
        }));
      }
    }
    Ok(self)
  }

  pub fn ignore_rules(&self) -> IgnoreRules {
    IgnoreRules::new(self.ignore.iter().cloned())
  }

  pub fn unknown_policy(&self) -> UnknownPackagePolicy {
    if self.include_unknown {
      UnknownPackagePolicy::Include
    } else {
      UnknownPackagePolicy::Drop
    }
  }

  /// Options for the affected analysis
  pub fn analysis_options(&self) -> AnalysisOptions {
    AnalysisOptions {
      ignore: self.ignore_rules(),
      unknown: self.unknown_policy(),
      report: self.report,
    }
  }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
/// and leading dots (`".go"` and `"go"` mean the same extension).
fn split_list(list: &str) -> Vec<String> {
  list
    .split(',')
    .map(|s| s.trim().trim_start_matches('.'))
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
