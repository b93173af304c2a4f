//! Vcpkg port metadata: `vcpkg.json` and `portfile.cmake`
//!
//! The manifest is rewritten through serde_json with key order preserved,
//! two-space indent and a trailing newline (the port tree's house style).
//! The portfile is never parsed as CMake; only the 128-hex SHA512 operand
//! is rewritten in place, everything else stays untouched.

use crate::core::error::{BumpError, BumpResult, MetadataError};
use crate::core::sources::UpsertOutcome;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static PORTFILE_SHA512: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(SHA512)\s+[0-9a-fA-F]{128}").expect("portfile digest pattern"));

static PORTFILE_REPO: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"REPO\s+([\w\-/.]+)").expect("portfile repo pattern"));

/// Read the `version` field of a port manifest without modifying it
///
/// The workflow checks this before fetching the archive, so an
/// idempotent re-run never touches the network.
pub fn manifest_version(path: &Path) -> BumpResult<Option<String>> {
  if !path.exists() {
    return Err(BumpError::Metadata(MetadataError::NotFound {
      path: path.to_path_buf(),
    }));
  }

  let content = fs::read_to_string(path)?;
  let manifest: Value = serde_json::from_str(&content).map_err(|e| {
    BumpError::Metadata(MetadataError::Malformed {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  })?;

  Ok(manifest.get("version").and_then(Value::as_str).map(str::to_string))
}

/// Set the `version` field of a port manifest
///
/// Reports `AlreadyPresent` without rewriting when the manifest already
/// carries `new_version`: re-running the bump is a safe no-op, same as
/// the recipe-side editor.
pub fn set_manifest_version(path: &Path, new_version: &str) -> BumpResult<UpsertOutcome> {
  if !path.exists() {
    return Err(BumpError::Metadata(MetadataError::NotFound {
      path: path.to_path_buf(),
    }));
  }

  let content = fs::read_to_string(path)?;
  let mut manifest: Value = serde_json::from_str(&content).map_err(|e| {
    BumpError::Metadata(MetadataError::Malformed {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  })?;

  let Some(object) = manifest.as_object_mut() else {
    return Err(BumpError::Metadata(MetadataError::Malformed {
      path: path.to_path_buf(),
      message: "manifest root is not an object".to_string(),
    }));
  };

  if object.get("version").and_then(Value::as_str) == Some(new_version) {
    return Ok(UpsertOutcome::AlreadyPresent);
  }

  object.insert("version".to_string(), Value::String(new_version.to_string()));

  // A bump resets any accumulated port revision. shift_remove keeps the
  // relative order of the remaining keys (remove would swap-remove).
  object.shift_remove("port-version");

  let mut rendered = serde_json::to_string_pretty(&manifest)?;
  rendered.push('\n');
  fs::write(path, rendered)?;
  Ok(UpsertOutcome::Added)
}

/// Replace the `SHA512` operand in a portfile with `new_digest`
pub fn replace_portfile_digest(path: &Path, new_digest: &str) -> BumpResult<()> {
  let content = fs::read_to_string(path)?;

  if !PORTFILE_SHA512.is_match(&content) {
    return Err(BumpError::Metadata(MetadataError::Malformed {
      path: path.to_path_buf(),
      message: "no SHA512 operand found".to_string(),
    }));
  }

  let updated = PORTFILE_SHA512.replace(&content, format!("${{1}} {}", new_digest));
  fs::write(path, updated.as_bytes())?;
  Ok(())
}

/// Extract the `REPO <owner>/<name>` slug from portfile content
pub fn portfile_repo(path: &Path, content: &str) -> BumpResult<String> {
  PORTFILE_REPO
    .captures(content)
    .map(|captures| captures[1].to_string())
    .ok_or_else(|| {
      BumpError::Metadata(MetadataError::Malformed {
        path: path.to_path_buf(),
        message: "no REPO line found".to_string(),
      })
    })
}
