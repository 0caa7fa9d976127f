mod commands;
mod core;
mod graph;
mod source;
mod utils;

use clap::Parser;
use commands::ChangeRange;
use crate::core::config::{AffectedConfig, ConfigOverrides};
use crate::core::error::{AffectedError, AffectedResult, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// List the Go packages affected by a change range
///
/// A package is affected when it contains a changed file, or when it
/// transitively depends on a package that does. Output is sorted, one
/// package per line.
#[derive(Parser)]
#[command(name = "go-affected")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Git range to diff (e.g. main..HEAD). Without one, uncommitted
  /// working tree and index changes are used.
  #[arg(conflicts_with_all = ["since", "from"])]
  range: Option<String>,

  /// Compare HEAD against this ref (same as `<ref>..HEAD`)
  #[arg(long, conflicts_with = "from")]
  since: Option<String>,

  /// Start ref (for SHA pair mode)
  #[arg(long)]
  from: Option<String>,

  /// End ref (for SHA pair mode, default: HEAD)
  #[arg(long, requires = "from")]
  to: Option<String>,

  /// Also include uncommitted working tree and index changes
  #[arg(long)]
  uncommitted: bool,

  /// Dir patterns (plain substrings) to ignore, comma-separated
  #[arg(long, value_name = "PATTERNS")]
  ignore_dirs: Option<String>,

  /// File extensions that count as source changes, comma-separated ("" = all files)
  #[arg(long, value_name = "EXTS")]
  ext: Option<String>,

  /// Report only packages containing a changed file, not their dependents
  #[arg(long)]
  edited_only: bool,

  /// Also report edited packages that have no dependency record
  #[arg(long)]
  include_unknown: bool,

  /// Read the dependency graph from a JSON file instead of running `go list`
  #[arg(long, value_name = "FILE")]
  graph: Option<PathBuf>,

  /// Config file (default: affected.toml, .affected.toml, .config/affected.toml)
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Output format: names (default), text, json
  #[arg(long, default_value = "names")]
  format: String,

  /// Show the changed files that would be analyzed, then stop
  #[arg(long)]
  dry_run: bool,

  /// Log diagnostics to stderr (same as RUST_LOG=debug)
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Log to stderr so stdout stays a clean package list
fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if let Err(err) = run(cli) {
    handle_error(err);
  }
}

fn run(cli: Cli) -> AffectedResult<()> {
  let root = std::env::current_dir()
    .map_err(|e| AffectedError::message(format!("Failed to get current directory: {}", e)))?;

  let overrides = ConfigOverrides {
    ignore_dirs: cli.ignore_dirs,
    extensions: cli.ext,
    edited_only: cli.edited_only,
    include_unknown: cli.include_unknown,
    graph: cli.graph,
  };
  let config = AffectedConfig::load(&root, cli.config.as_deref())?
    .with_overrides(&overrides)
    .validate()?;

  let mut changes = ChangeRange::from_args(cli.range, cli.since, cli.from, cli.to);
  changes.uncommitted = cli.uncommitted;

  // Build module context once (module path, closure, config)
  let ctx = crate::core::context::ModuleContext::build(&root, config)?;

  commands::run_affected(&ctx, &changes, &cli.format, cli.dry_run)
}

fn handle_error(err: AffectedError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
