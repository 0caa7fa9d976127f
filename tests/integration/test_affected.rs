//! Integration tests for the `go-affected` command

use crate::helpers::{TestModule, affected_lines, git, go_affected_raw, pkg_id, run_go_affected};
use anyhow::Result;

fn ids(dirs: &[&str]) -> Vec<String> {
  dirs.iter().copied().map(pkg_id).collect()
}

#[test]
fn test_affected_basic() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.commit("Modify a")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?;

  // a is edited, b and c depend on it, d is untouched
  assert_eq!(lines, ids(&["a", "b", "c"]));

  Ok(())
}

#[test]
fn test_affected_leaf_change() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("c/c.go", "package c\n\nfunc C() {}\n")?;
  module.commit("Modify c")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?;
  assert_eq!(lines, ids(&["c"]));

  Ok(())
}

#[test]
fn test_affected_range_forms() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("b/b.go", "package b\n\nfunc B() {}\n")?;
  module.commit("Modify b")?;

  let expected = ids(&["b", "c"]);
  assert_eq!(affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?, expected);
  assert_eq!(affected_lines(&module.path, &["--graph", "deps.json", "base...HEAD"])?, expected);
  assert_eq!(
    affected_lines(&module.path, &["--graph", "deps.json", "--since", "base"])?,
    expected
  );
  assert_eq!(
    affected_lines(&module.path, &["--graph", "deps.json", "--from", "base", "--to", "HEAD"])?,
    expected
  );

  Ok(())
}

#[test]
fn test_affected_no_changes() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  let output = run_go_affected(&module.path, &["--graph", "deps.json", "base..HEAD"])?;

  assert!(output.status.success());
  assert!(output.stdout.is_empty(), "expected no output, got: {:?}", output.stdout);

  Ok(())
}

#[test]
fn test_affected_non_source_files_skipped() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/README.md", "# a\n")?;
  module.commit("Docs only")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?;
  assert!(lines.is_empty(), "docs change should affect nothing, got: {:?}", lines);

  Ok(())
}

#[test]
fn test_affected_edited_only() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.commit("Modify a")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "--edited-only", "base..HEAD"])?;
  assert_eq!(lines, ids(&["a"]));

  Ok(())
}

#[test]
fn test_affected_default_ignore() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file(".checkout_git/tmp/x.go", "package tmp\n")?;
  module.commit("Scratch checkout")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "--include-unknown", "base..HEAD"])?;
  assert!(lines.is_empty(), "ignored dir leaked into output: {:?}", lines);

  // Disabling ignore rules lets the package through as unknown
  let lines = affected_lines(
    &module.path,
    &["--graph", "deps.json", "--include-unknown", "--ignore-dirs", "", "base..HEAD"],
  )?;
  assert_eq!(lines, ids(&[".checkout_git/tmp"]));

  Ok(())
}

#[test]
fn test_affected_custom_ignore() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.write_file("d/d.go", "package d\n\nfunc D() {}\n")?;
  module.commit("Modify a and d")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "--ignore-dirs", "a/,zz", "base..HEAD"])?;
  assert_eq!(lines, ids(&["d"]));

  Ok(())
}

#[test]
fn test_affected_unknown_package() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  // e has no entry in deps.json
  module.write_file("e/e.go", "package e\n")?;
  module.commit("Add e")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?;
  assert!(lines.is_empty(), "unknown package should be dropped, got: {:?}", lines);

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "--include-unknown", "base..HEAD"])?;
  assert_eq!(lines, ids(&["e"]));

  Ok(())
}

#[test]
fn test_affected_uncommitted() -> Result<()> {
  let module = TestModule::new()?;

  // One unstaged edit, one staged edit
  module.write_file("d/d.go", "package d\n\nfunc D() {}\n")?;
  module.write_file("b/b.go", "package b\n\nfunc B() {}\n")?;
  git(&module.repo, &["add", "b/b.go"])?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json"])?;
  assert_eq!(lines, ids(&["b", "c", "d"]));

  Ok(())
}

#[test]
fn test_affected_range_with_uncommitted() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("b/b.go", "package b\n\nfunc B() {}\n")?;
  module.commit("Modify b")?;
  module.write_file("d/d.go", "package d\n\nfunc D() {}\n")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?;
  assert_eq!(lines, ids(&["b", "c"]));

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "--uncommitted", "base..HEAD"])?;
  assert_eq!(lines, ids(&["b", "c", "d"]));

  Ok(())
}

#[test]
fn test_affected_module_in_subdir() -> Result<()> {
  let module = TestModule::in_subdir("go")?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  // Outside the module: must not map to a package
  module.write_repo_file("tools/gen.go", "package tools\n")?;
  module.commit("Modify a and tools")?;

  let lines = affected_lines(&module.path, &["--graph", "deps.json", "--include-unknown", "base..HEAD"])?;
  assert_eq!(lines, ids(&["a", "b", "c"]));

  Ok(())
}

#[test]
fn test_affected_from_package_dir() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.commit("Modify a")?;

  let from_root = affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?;
  let from_pkg = affected_lines(&module.path.join("b"), &["--graph", "../deps.json", "base..HEAD"])?;

  // Package paths stay rooted at go.mod wherever the tool runs
  assert_eq!(from_root, ids(&["a", "b", "c"]));
  assert_eq!(from_pkg, from_root);

  Ok(())
}

#[test]
fn test_affected_from_nested_package_dir() -> Result<()> {
  let module = TestModule::new()?;
  module.write_file("pkg/x/x.go", "package x\n")?;
  module.write_file("pkg/y/y.go", "package y\n")?;
  module.write_graph(&[
    ("a", &[][..]),
    ("pkg/x", &[][..]),
    ("pkg/y", &["pkg/x"][..]),
  ])?;
  module.commit("Add pkg/x and pkg/y")?;
  module.mark_base()?;

  module.write_file("pkg/x/x.go", "package x\n\nfunc X() {}\n")?;
  module.commit("Modify pkg/x")?;

  let expected = ids(&["pkg/x", "pkg/y"]);
  assert_eq!(affected_lines(&module.path, &["--graph", "deps.json", "base..HEAD"])?, expected);
  assert_eq!(
    affected_lines(&module.path.join("pkg"), &["--graph", "../deps.json", "base..HEAD"])?,
    expected
  );
  assert_eq!(
    affected_lines(&module.path.join("pkg/y"), &["--graph", "../../deps.json", "base..HEAD"])?,
    expected
  );

  Ok(())
}

#[test]
fn test_affected_from_package_dir_of_module_in_subdir() -> Result<()> {
  let module = TestModule::in_subdir("go")?;
  module.mark_base()?;

  module.write_file("b/b.go", "package b\n\nfunc B() {}\n")?;
  module.commit("Modify b")?;

  let lines = affected_lines(&module.path.join("c"), &["--graph", "../deps.json", "base..HEAD"])?;
  assert_eq!(lines, ids(&["b", "c"]));

  Ok(())
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.write_file("a/README.md", "# a\n")?;
  module.commit("Modify a")?;

  let output = run_go_affected(&module.path, &["--graph", "deps.json", "--format", "json", "base..HEAD"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["module"], "example.com/m");
  assert_eq!(json["range"], "base..HEAD");
  assert_eq!(json["changed_files"], serde_json::json!(["a/a.go"]));
  assert_eq!(json["impact"]["edited"], serde_json::json!(ids(&["a"])));
  assert_eq!(json["impact"]["dependents"], serde_json::json!(ids(&["b", "c"])));
  assert_eq!(json["packages"], serde_json::json!(ids(&["a", "b", "c"])));
  assert_eq!(json["summary"]["packages_count"], 3);

  Ok(())
}

#[test]
fn test_affected_text_output() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("b/b.go", "package b\n\nfunc B() {}\n")?;
  module.commit("Modify b")?;

  let output = run_go_affected(&module.path, &["--graph", "deps.json", "--format", "text", "base..HEAD"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Affected Analysis"), "got: {}", stdout);
  assert!(stdout.contains("Changed files: 1"));
  assert!(stdout.contains("Reported (affected): 2 packages"));

  Ok(())
}

#[test]
fn test_affected_dry_run() -> Result<()> {
  let module = TestModule::new()?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.commit("Modify a")?;

  let output = run_go_affected(&module.path, &["--graph", "deps.json", "--dry-run", "base..HEAD"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN"), "got: {}", stdout);
  assert!(stdout.contains("a/a.go"));
  assert!(!stdout.contains(&pkg_id("b")), "dry run should not report packages");

  Ok(())
}

#[test]
fn test_affected_config_file() -> Result<()> {
  let module = TestModule::new()?;
  module.write_file(
    "affected.toml",
    r#"graph = "deps.json"
report = "edited"
"#,
  )?;
  module.commit("Add config")?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.commit("Modify a")?;

  // No --graph: the config supplies it
  let lines = affected_lines(&module.path, &["base..HEAD"])?;
  assert_eq!(lines, ids(&["a"]));

  Ok(())
}

#[test]
fn test_affected_invalid_config() -> Result<()> {
  let module = TestModule::new()?;
  module.write_file("affected.toml", "not_a_field = true\n")?;

  let output = go_affected_raw(&module.path, &["--graph", "deps.json"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}

#[test]
fn test_affected_bad_range_fails() -> Result<()> {
  let module = TestModule::new()?;

  let output = go_affected_raw(&module.path, &["--graph", "deps.json", "no-such-ref..HEAD"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
  assert!(stderr.contains("git"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_affected_missing_graph_fails() -> Result<()> {
  let module = TestModule::new()?;

  let output = go_affected_raw(&module.path, &["--graph", "missing.json"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr);
  assert!(output.stdout.is_empty());
  assert!(stderr.contains("missing.json"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_affected_direct_graph_flattened() -> Result<()> {
  let module = TestModule::new()?;
  // Direct edges only: c -> b -> a
  module.write_file(
    "direct.json",
    r#"{
  "module": "example.com/m",
  "transitive": false,
  "packages": {
    "example.com/m/a": [],
    "example.com/m/b": ["example.com/m/a"],
    "example.com/m/c": ["example.com/m/b"],
    "example.com/m/d": []
  }
}
"#,
  )?;
  module.commit("Add direct graph")?;
  module.mark_base()?;

  module.write_file("a/a.go", "package a\n\nfunc A() {}\n")?;
  module.commit("Modify a")?;

  let lines = affected_lines(&module.path, &["--graph", "direct.json", "base..HEAD"])?;
  assert_eq!(lines, ids(&["a", "b", "c"]));

  Ok(())
}
