pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::BumpResult;
use std::path::Path;

/// Capability interface over the version-control system
///
/// One method per operation the bump workflow performs, so tests can
/// substitute a recording fake and the driver never spawns a process
/// directly. All branch/remote arguments are plain names; refspecs are
/// passed through to git untouched.
pub trait VersionControl {
  /// Switch to an existing branch
  fn checkout(&self, branch: &str) -> BumpResult<()>;

  /// Fetch a remote (all refs)
  fn fetch(&self, remote: &str) -> BumpResult<()>;

  /// Fetch a single refspec from a remote (e.g. `branch:local`)
  fn fetch_refspec(&self, remote: &str, refspec: &str) -> BumpResult<()>;

  /// Rebase the current branch onto `upstream` (e.g. `upstream/master`)
  fn rebase(&self, upstream: &str) -> BumpResult<()>;

  /// Push the current branch to its configured upstream
  fn push(&self) -> BumpResult<()>;

  /// Push `branch` to `remote`, setting the upstream tracking ref
  fn push_upstream(&self, remote: &str, branch: &str) -> BumpResult<()>;

  /// Push a refspec to a remote (e.g. `HEAD:feature`)
  fn push_refspec(&self, remote: &str, refspec: &str) -> BumpResult<()>;

  /// Whether a local branch with this name exists
  fn branch_exists(&self, branch: &str) -> BumpResult<bool>;

  /// Create `branch` at HEAD and switch to it
  fn create_branch(&self, branch: &str) -> BumpResult<()>;

  /// Delete a local branch (force)
  fn delete_branch(&self, branch: &str) -> BumpResult<()>;

  /// Name of the currently checked-out branch
  fn current_branch(&self) -> BumpResult<String>;

  /// Stage the given paths
  fn stage(&self, paths: &[&Path]) -> BumpResult<()>;

  /// Commit staged changes with `message`
  fn commit(&self, message: &str) -> BumpResult<()>;

  /// Stage every tracked modification and commit with `message`
  fn commit_all(&self, message: &str) -> BumpResult<()>;

  /// List configured remote names
  fn remotes(&self) -> BumpResult<Vec<String>>;

  /// URL of a configured remote
  fn remote_url(&self, remote: &str) -> BumpResult<String>;

  /// Add a remote; succeeds if it already exists with any URL
  fn add_remote(&self, name: &str, url: &str) -> BumpResult<()>;

  /// Remove a configured remote
  fn remove_remote(&self, name: &str) -> BumpResult<()>;
}
