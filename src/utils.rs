//! Utility functions for slash-separated import paths
//!
//! Git reports paths with forward slashes on every platform and Go import
//! paths are slash-separated too, so these helpers work on `&str` rather than
//! `std::path::Path` (which would use `\` on Windows).

/// Lexically clean a slash-separated path
///
/// - Collapses repeated slashes
/// - Drops `.` segments
/// - Resolves `..` against the preceding segment (leading `..` are kept for
///   relative paths, dropped for rooted ones)
/// - Returns `"."` for an empty result
pub fn clean_slash_path(path: &str) -> String {
  let rooted = path.starts_with('/');
  let mut segments: Vec<&str> = Vec::new();

  for segment in path.split('/') {
    match segment {
      "" | "." => {}
      ".." => match segments.last() {
        Some(&last) if last != ".." => {
          segments.pop();
        }
        _ if rooted => {}
        _ => segments.push(".."),
      },
      other => segments.push(other),
    }
  }

  let joined = segments.join("/");
  match (rooted, joined.is_empty()) {
    (true, _) => format!("/{}", joined),
    (false, true) => ".".to_string(),
    (false, false) => joined,
  }
}

/// Join two slash-separated paths and clean the result
///
/// An empty side is ignored entirely, so `join_slash_path("", "a.go")` is
/// `"a.go"`.
pub fn join_slash_path(base: &str, rel: &str) -> String {
  match (base.is_empty(), rel.is_empty()) {
    (true, true) => String::new(),
    (true, false) => clean_slash_path(rel),
    (false, true) => clean_slash_path(base),
    (false, false) => clean_slash_path(&format!("{}/{}", base, rel)),
  }
}

/// Directory part of a slash-separated path (everything before the last `/`)
///
/// Returns `"."` when the path has no directory part.
pub fn slash_dir(path: &str) -> String {
  match path.rfind('/') {
    Some(0) => "/".to_string(),
    Some(idx) => clean_slash_path(&path[..idx]),
    None => ".".to_string(),
  }
}
