//! System git backend - zero dependencies
//!
//! Every operation shells out to the `git` binary with an isolated
//! environment and the working directory pinned to the monorepo root.
//! Output is inherited so rebase conflicts, push rejections and hook
//! chatter land on the operator's terminal exactly as if they had typed
//! the command themselves.

use crate::core::error::{BumpError, BumpResult, GitError, ResultExt};
use crate::core::vcs::VersionControl;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
#[derive(Debug)]
pub struct SystemGit {
  /// Working tree root
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open the repository containing `path`
  pub fn open(path: &Path) -> BumpResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(BumpError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(BumpError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Self {
      work_tree: PathBuf::from(stdout.trim()),
    })
  }

  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a git command with isolated environment
  ///
  /// - Pins the working directory to the work tree
  /// - Clears environment variables, whitelisting PATH and HOME
  /// - Overrides chatty advice config
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(&self.work_tree);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd
  }

  /// Run a git subcommand, streaming its output to the terminal
  fn run(&self, args: &[&str]) -> BumpResult<()> {
    println!("▶ git {}", args.join(" "));

    let status = self
      .git_cmd()
      .args(args)
      .status()
      .with_context(|| format!("Failed to execute git {}", args.first().unwrap_or(&"")))?;

    if !status.success() {
      return Err(BumpError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: format!("exit status {}", status.code().map_or("signal".to_string(), |c| c.to_string())),
      }));
    }
    Ok(())
  }

  /// Run a git subcommand quietly, capturing stdout
  fn run_captured(&self, args: &[&str]) -> BumpResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().unwrap_or(&"")))?;

    if !output.status.success() {
      return Err(BumpError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

impl VersionControl for SystemGit {
  fn checkout(&self, branch: &str) -> BumpResult<()> {
    self.run(&["checkout", branch])
  }

  fn fetch(&self, remote: &str) -> BumpResult<()> {
    self.run(&["fetch", remote])
  }

  fn fetch_refspec(&self, remote: &str, refspec: &str) -> BumpResult<()> {
    self.run(&["fetch", remote, refspec])
  }

  fn rebase(&self, upstream: &str) -> BumpResult<()> {
    self.run(&["rebase", upstream])
  }

  fn push(&self) -> BumpResult<()> {
    self.run(&["push"])
  }

  fn push_upstream(&self, remote: &str, branch: &str) -> BumpResult<()> {
    self.run(&["push", "-u", remote, branch])
  }

  fn push_refspec(&self, remote: &str, refspec: &str) -> BumpResult<()> {
    self.run(&["push", remote, refspec])
  }

  fn branch_exists(&self, branch: &str) -> BumpResult<bool> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
      .output()
      .context("Failed to execute git rev-parse --verify")?;
    Ok(output.status.success())
  }

  fn create_branch(&self, branch: &str) -> BumpResult<()> {
    self.run(&["checkout", "-b", branch])
  }

  fn delete_branch(&self, branch: &str) -> BumpResult<()> {
    self.run(&["branch", "-D", branch])
  }

  fn current_branch(&self) -> BumpResult<String> {
    Ok(self.run_captured(&["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string())
  }

  fn stage(&self, paths: &[&Path]) -> BumpResult<()> {
    let mut args = vec!["add".to_string()];
    for path in paths {
      args.push(path.display().to_string());
    }
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    self.run(&arg_refs)
  }

  fn commit(&self, message: &str) -> BumpResult<()> {
    self.run(&["commit", "-m", message])
  }

  fn commit_all(&self, message: &str) -> BumpResult<()> {
    self.run(&["commit", "-am", message])
  }

  fn remotes(&self) -> BumpResult<Vec<String>> {
    Ok(
      self
        .run_captured(&["remote"])?
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect(),
    )
  }

  fn remote_url(&self, remote: &str) -> BumpResult<String> {
    Ok(self.run_captured(&["remote", "get-url", remote])?.trim().to_string())
  }

  fn add_remote(&self, name: &str, url: &str) -> BumpResult<()> {
    let output = self
      .git_cmd()
      .args(["remote", "add", name, url])
      .output()
      .context("Failed to execute git remote add")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("already exists") {
        return Ok(());
      }
      return Err(BumpError::Git(GitError::CommandFailed {
        command: "git remote add".to_string(),
        stderr: stderr.to_string(),
      }));
    }
    Ok(())
  }

  fn remove_remote(&self, name: &str) -> BumpResult<()> {
    self.run(&["remote", "remove", name])
  }
}
