//! Pull-request creation through the forge CLI
//!
//! The forge is strictly optional: by the time a PR could be opened the
//! branch is already pushed, so a missing or failing `gh` downgrades to
//! an informational message instead of failing the run.

use crate::core::error::{BumpError, BumpResult, ResultExt};
use std::io::Write;
use std::process::Command;

/// Capability interface over the forge CLI
pub trait ForgeClient {
  /// Whether the CLI is installed and usable
  fn available(&self) -> bool;

  /// Open a pull request for the current branch
  fn open_pr(&self, title: Option<&str>, body: &str) -> BumpResult<()>;
}

/// GitHub CLI (`gh`) client
pub struct GhForge;

impl ForgeClient for GhForge {
  fn available(&self) -> bool {
    which::which("gh").is_ok()
  }

  fn open_pr(&self, title: Option<&str>, body: &str) -> BumpResult<()> {
    // gh reads the body from a file; hand it over through a tempfile
    // that outlives the subprocess.
    let mut body_file = tempfile::NamedTempFile::new().context("Failed to create PR body file")?;
    body_file.write_all(body.as_bytes()).context("Failed to write PR body file")?;
    body_file.flush().context("Failed to flush PR body file")?;

    let mut cmd = Command::new("gh");
    cmd.args(["pr", "create", "--fill", "--body-file"]);
    cmd.arg(body_file.path());
    if let Some(title) = title {
      cmd.args(["--title", title]);
    }

    println!("▶ gh pr create --fill --body-file <template>");
    let status = cmd.status().context("Failed to execute gh pr create")?;
    if !status.success() {
      return Err(BumpError::message(format!(
        "gh pr create exited with status {}",
        status.code().map_or("signal".to_string(), |c| c.to_string())
      )));
    }
    Ok(())
  }
}
