//! The release workflow: a linear state machine over external state
//!
//! ```text
//! SYNC → BRANCH → EDIT → [BUILD?] → COMMIT → [post-commit] → PUSH → [PR?]
//! ```
//!
//! Every stage is guarded by the success of the previous one. Failures
//! are fail-fast and never rolled back: a failed push does not un-commit,
//! a failed build leaves the edit in the working tree for inspection.
//! The one built-in recovery path is the idempotency short-circuit at
//! EDIT: a version that is already recorded ends the run cleanly with
//! nothing to commit.

use crate::core::builder::Builder;
use crate::core::error::{BumpError, BumpResult, GitError};
use crate::core::fetch::ArchiveFetcher;
use crate::core::forge::ForgeClient;
use crate::core::vcs::VersionControl;
use std::path::{Path, PathBuf};

/// Options shared by both ecosystem bump commands
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
  pub package: String,
  pub version: String,
  /// Explicit branch name; derived from prefix/package/version when unset
  pub branch: Option<String>,
  pub prefix: String,
  pub trunk: String,
  pub push_remote: String,
  pub rebase_remote: String,
  pub no_build: bool,
  pub no_pr: bool,
}

impl WorkflowOptions {
  /// The branch this bump will live on
  pub fn branch_name(&self) -> String {
    self
      .branch
      .clone()
      .unwrap_or_else(|| format!("{}/{}-{}", self.prefix, self.package, self.version))
  }
}

/// What the EDIT stage did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
  /// Metadata edited; these paths need staging
  Applied { files: Vec<PathBuf> },
  /// The version is already recorded; nothing was modified
  AlreadyPresent,
}

/// Per-ecosystem half of the workflow
///
/// The driver owns stage ordering and failure semantics; the target owns
/// what "edit the metadata" and "regenerate derived state" mean for its
/// tree.
pub trait BumpTarget {
  /// Derive the URL, fetch/digest the archive, edit the metadata
  fn edit(&self, fetcher: &dyn ArchiveFetcher) -> BumpResult<EditOutcome>;

  /// Commit message for the bump commit
  fn commit_message(&self) -> String;

  /// Regenerate derived state after the bump commit (may create its own
  /// commit); default is a no-op
  fn post_commit(&self, vcs: &dyn VersionControl) -> BumpResult<()> {
    let _ = vcs;
    Ok(())
  }

  /// Explicit PR title, when the ecosystem convention wants one
  fn pr_title(&self) -> Option<String> {
    None
  }

  /// PR body text
  fn pr_body(&self) -> String;
}

/// How a run ended (both variants are success)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
  /// All stages ran; the branch is pushed
  Completed { branch: String },
  /// Idempotent no-op: the version was already recorded
  AlreadyPresent,
}

/// The workflow driver
pub struct Workflow<'a> {
  pub vcs: &'a dyn VersionControl,
  pub fetcher: &'a dyn ArchiveFetcher,
  pub builder: &'a dyn Builder,
  pub forge: &'a dyn ForgeClient,
}

impl Workflow<'_> {
  pub fn run(&self, options: &WorkflowOptions, target: &dyn BumpTarget) -> BumpResult<WorkflowOutcome> {
    // SYNC: bring trunk up to date and keep its published copy current.
    println!(
      "🔄 Syncing {} with {}/{}",
      options.trunk, options.rebase_remote, options.trunk
    );
    self.vcs.checkout(&options.trunk)?;
    self.vcs.fetch(&options.rebase_remote)?;
    self.vcs.rebase(&format!("{}/{}", options.rebase_remote, options.trunk))?;
    self.vcs.push()?;

    // BRANCH: reusing an existing branch silently would mix unrelated
    // work into the bump, so it is operator error.
    let branch = options.branch_name();
    if self.vcs.branch_exists(&branch)? {
      return Err(BumpError::Git(GitError::BranchExists { branch }));
    }
    self.vcs.create_branch(&branch)?;

    // EDIT
    let files = match target.edit(self.fetcher)? {
      EditOutcome::AlreadyPresent => {
        println!(
          "✅ {} already records {}; nothing to commit.",
          options.package, options.version
        );
        return Ok(WorkflowOutcome::AlreadyPresent);
      }
      EditOutcome::Applied { files } => files,
    };

    // BUILD
    if options.no_build {
      println!("⏭️  Skipping build verification (--no-build)");
    } else {
      self.builder.verify()?;
    }

    // COMMIT: stage exactly what EDIT touched.
    let file_refs: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    self.vcs.stage(&file_refs)?;
    self.vcs.commit(&target.commit_message())?;

    target.post_commit(self.vcs)?;

    // PUSH
    self.vcs.push_upstream(&options.push_remote, &branch)?;

    // PR: the branch is already published, so forge trouble is
    // information, not failure.
    if options.no_pr {
      println!("⏭️  Skipping PR creation (--no-pr); branch: {}", branch);
    } else if self.forge.available() {
      if let Err(err) = self.forge.open_pr(target.pr_title().as_deref(), &target.pr_body()) {
        println!("⚠️  PR creation failed ({}); open one manually for branch {}", err, branch);
      }
    } else {
      println!("⚠️  GitHub CLI not found; open a PR manually for branch {}", branch);
    }

    Ok(WorkflowOutcome::Completed { branch })
  }
}
