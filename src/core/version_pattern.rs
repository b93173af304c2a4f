//! Version-substring detection and substitution in archive URLs
//!
//! The matching grammar is a single named rule set shared by both
//! ecosystems, so the two bump flows cannot drift apart:
//!
//! - version shape: one or more dot-separated numeric groups, an optional
//!   literal `v` prefix, an optional `[A-Za-z0-9_-]` pre-release suffix
//! - anchor: a known archive extension immediately after the version
//!
//! An extension-anchored match wins; otherwise the first version-shaped
//! substring anywhere in the URL is used. Everything outside the matched
//! version span (scheme, host, subpaths, the `v` prefix, the extension,
//! query strings) is carried over untouched.

use crate::core::error::{BumpError, BumpResult, UrlError};
use regex::Regex;
use std::sync::LazyLock;

/// Archive suffixes that anchor a version match
pub const ARCHIVE_EXTENSIONS: &[&str] = &["tar.gz", "tar.xz", "tar.bz2", "tgz", "zip"];

const VERSION_SHAPE: &str = r"\d+(?:\.\d+)*[A-Za-z0-9_-]*";

// The regex crate has no lookahead, so the anchored rule captures the
// extension instead of asserting it; only the version group is replaced.
static ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
  let extensions = ARCHIVE_EXTENSIONS
    .iter()
    .map(|ext| regex::escape(ext))
    .collect::<Vec<_>>()
    .join("|");
  Regex::new(&format!(r"v?({})\.(?:{})", VERSION_SHAPE, extensions)).expect("anchored version pattern")
});

static ANYWHERE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(&format!(r"v?({})", VERSION_SHAPE)).expect("fallback version pattern"));

/// Locate the version substring in `url` per the rule set above
///
/// Returns the byte range of the bare version (the `v` prefix and the
/// extension stay outside the span).
pub fn find_version_span(url: &str) -> Option<std::ops::Range<usize>> {
  let captures = ANCHORED.captures(url).or_else(|| ANYWHERE.captures(url))?;
  captures.get(1).map(|m| m.range())
}

/// Derive the archive URL for `new_version` from a known-good URL
///
/// Substitution-only: `derive_url(url, old_version)` recovers `url` exactly.
/// `new_version` is inserted verbatim; validating its syntax is the
/// caller's job.
pub fn derive_url(existing_url: &str, new_version: &str) -> BumpResult<String> {
  let span = find_version_span(existing_url).ok_or_else(|| {
    BumpError::Url(UrlError::PatternNotFound {
      url: existing_url.to_string(),
    })
  })?;

  let mut derived = String::with_capacity(existing_url.len() + new_version.len());
  derived.push_str(&existing_url[..span.start]);
  derived.push_str(new_version);
  derived.push_str(&existing_url[span.end..]);
  Ok(derived)
}
