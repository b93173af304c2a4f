//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A package monorepo with git history and local bare remotes
///
/// The layout mirrors what the workflow expects in production: a work
/// tree with `recipes/` and `ports/`, an `origin` remote (the operator's
/// fork) and an `upstream` remote (the canonical repo), both plain bare
/// repositories on disk so no test ever touches the network.
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a monorepo with one commit on master, pushed to both remotes
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("repo");
    std::fs::create_dir(&path)?;

    git(&path, &["init", "--initial-branch=master"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join("README.md"), "# test monorepo\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial layout"])?;

    for remote in ["origin", "upstream"] {
      let bare = root.path().join(format!("{}.git", remote));
      git(root.path(), &["init", "--bare", bare.to_str().unwrap()])?;
      git(&path, &["remote", "add", remote, bare.to_str().unwrap()])?;
    }
    git(&path, &["push", "-u", "origin", "master"])?;
    git(&path, &["push", "upstream", "master"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a Conan-style recipe with one recorded version
  pub fn add_recipe(&self, name: &str, version: &str, sha256: &str) -> Result<()> {
    let subdir = self.path.join("recipes").join(name).join("all");
    std::fs::create_dir_all(&subdir)?;

    std::fs::write(
      subdir.join("sources.toml"),
      format!(
        "[sources]\n\"{}\" = {{ url = \"https://x/archive/v{}.tar.gz\", sha256 = \"{}\" }}\n",
        version, version, sha256
      ),
    )?;
    std::fs::write(
      self.path.join("recipes").join(name).join("versions.toml"),
      format!("[versions]\n\"{}\" = {{ folder = \"all\" }}\n", version),
    )?;

    self.commit(&format!("{}: Add {}", name, version))?;
    Ok(())
  }

  /// Add a Vcpkg-style port at the given version
  pub fn add_port(&self, name: &str, version: &str, sha512: &str) -> Result<()> {
    let port_dir = self.path.join("ports").join(name);
    std::fs::create_dir_all(&port_dir)?;

    std::fs::write(
      port_dir.join("vcpkg.json"),
      format!("{{\n  \"name\": \"{}\",\n  \"version\": \"{}\"\n}}\n", name, version),
    )?;
    std::fs::write(
      port_dir.join("portfile.cmake"),
      format!(
        "vcpkg_from_github(\n    REPO example/{}\n    REF \"v${{VERSION}}\"\n    SHA512 {}\n)\n",
        name, sha512
      ),
    )?;

    self.commit(&format!("[{}] Add {}", name, version))?;
    Ok(())
  }

  /// Commit current changes and push master so the remotes stay in step
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    git(&self.path, &["push", "origin", "master"])?;
    git(&self.path, &["push", "upstream", "master"])?;
    Ok(())
  }

  /// Create a local branch without switching to it
  pub fn create_branch(&self, name: &str) -> Result<()> {
    git(&self.path, &["branch", name])?;
    Ok(())
  }

  /// Name of the currently checked-out branch
  pub fn current_branch(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Read a file relative to the monorepo root
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git in a directory, failing the test on error
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the portbump binary; the caller asserts on the exit status
pub fn run_portbump(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_portbump");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run portbump")
}
