//! Local build verification for edited recipes
//!
//! A broken recipe must never be committed, so the ecosystem's own build
//! command runs between the metadata edit and the commit. The command's
//! output is inherited: build logs go straight to the operator.

use crate::core::error::{BuildError, BumpError, BumpResult, ResultExt};
use std::path::PathBuf;
use std::process::Command;

/// Capability interface for the ecosystem's build/verification command
pub trait Builder {
  /// Build the edited recipe; non-zero exit is fatal
  fn verify(&self) -> BumpResult<()>;
}

fn run_checked(mut cmd: Command, printable: String) -> BumpResult<()> {
  println!("▶ {}", printable);
  let status = cmd.status().with_context(|| format!("Failed to execute {}", printable))?;
  if !status.success() {
    return Err(BumpError::Build(BuildError::VerificationFailed {
      command: printable,
      code: status.code(),
    }));
  }
  Ok(())
}

/// `conan create <conanfile> --version <version> --build=missing`
pub struct ConanBuilder {
  pub conanfile: PathBuf,
  pub version: String,
}

impl Builder for ConanBuilder {
  fn verify(&self) -> BumpResult<()> {
    let mut cmd = Command::new("conan");
    cmd
      .arg("create")
      .arg(&self.conanfile)
      .args(["--version", &self.version, "--build=missing"]);
    run_checked(
      cmd,
      format!(
        "conan create {} --version {} --build=missing",
        self.conanfile.display(),
        self.version
      ),
    )
  }
}

/// Helper around the in-tree `./vcpkg` binary
pub struct VcpkgTool {
  /// Monorepo root, where `./vcpkg` lives
  pub root: PathBuf,
}

impl VcpkgTool {
  fn vcpkg_cmd(&self, args: &[&str]) -> Command {
    let mut cmd = Command::new(self.root.join("vcpkg"));
    cmd.current_dir(&self.root);
    cmd.args(args);
    cmd
  }

  /// Drop cached install state so the port rebuilds from scratch
  pub fn clean_state(&self) -> BumpResult<()> {
    for dir in ["installed", "packages", "downloads"] {
      let path = self.root.join(dir);
      if path.exists() {
        std::fs::remove_dir_all(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
      }
    }
    Ok(())
  }

  /// `./vcpkg install <port>`
  pub fn install(&self, port: &str) -> BumpResult<()> {
    run_checked(self.vcpkg_cmd(&["install", port]), format!("./vcpkg install {}", port))
  }

  /// `./vcpkg x-add-version <port> --overwrite-version`
  pub fn add_version(&self, port: &str) -> BumpResult<()> {
    run_checked(
      self.vcpkg_cmd(&["x-add-version", port, "--overwrite-version"]),
      format!("./vcpkg x-add-version {} --overwrite-version", port),
    )
  }
}

/// Clean state, then `./vcpkg install <port>`
pub struct VcpkgBuilder {
  pub tool: VcpkgTool,
  pub port: String,
}

impl Builder for VcpkgBuilder {
  fn verify(&self) -> BumpResult<()> {
    self.tool.clean_state()?;
    self.tool.install(&self.port)
  }
}
