//! Vcpkg port bump command
//!
//! Same staged workflow as the Conan side, with the port tree's own
//! metadata: the `version` field in `vcpkg.json`, the SHA512 operand in
//! `portfile.cmake`, and a version-database regeneration commit after
//! the bump commit.

use crate::core::builder::{VcpkgBuilder, VcpkgTool};
use crate::core::config::BumpConfig;
use crate::core::error::{BumpError, BumpResult, MetadataError};
use crate::core::fetch::{ArchiveFetcher, HashAlgorithm, HttpFetcher};
use crate::core::forge::GhForge;
use crate::core::manifest::{manifest_version, portfile_repo, replace_portfile_digest, set_manifest_version};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::core::workflow::{BumpTarget, EditOutcome, Workflow, WorkflowOptions, WorkflowOutcome};
use std::fs;
use std::path::PathBuf;

const PORTS_DIR: &str = "ports";

const PR_TEMPLATE: &str = "\
- [x] Changes comply with the [maintainer guide](https://github.com/microsoft/vcpkg-docs/blob/main/vcpkg/contributing/maintainer-guide.md).
- [x] SHA512s are updated for each updated download.
- [x] The \"supports\" clause reflects platforms that may be fixed by this new version.
- [x] Any fixed [CI baseline](https://github.com/microsoft/vcpkg/blob/master/scripts/ci.baseline.txt) entries are removed from that file.
- [x] Any patches that are no longer applied are deleted from the port's directory.
- [x] The version database is fixed by rerunning `./vcpkg x-add-version --all` and committing the result.
- [x] Only one version is added to each modified port's versions file.
";

/// CLI arguments for `portbump vcpkg`
pub struct VcpkgArgs {
  pub port: String,
  pub version: String,
  pub prefix: Option<String>,
  pub branch: Option<String>,
  pub trunk: Option<String>,
  pub push_remote: Option<String>,
  pub rebase_remote: Option<String>,
  pub no_build: bool,
  pub no_pr: bool,
}

/// The Vcpkg half of the workflow
struct VcpkgTarget {
  port: String,
  version: String,
  manifest_path: PathBuf,
  portfile_path: PathBuf,
  tool: VcpkgTool,
}

impl BumpTarget for VcpkgTarget {
  fn edit(&self, fetcher: &dyn ArchiveFetcher) -> BumpResult<EditOutcome> {
    // Idempotency first, read-only: a re-run for the recorded version
    // never fetches and never rewrites.
    if manifest_version(&self.manifest_path)?.as_deref() == Some(self.version.as_str()) {
      return Ok(EditOutcome::AlreadyPresent);
    }

    if !self.portfile_path.exists() {
      return Err(BumpError::Metadata(MetadataError::NotFound {
        path: self.portfile_path.clone(),
      }));
    }
    let portfile = fs::read_to_string(&self.portfile_path)?;
    let repo = portfile_repo(&self.portfile_path, &portfile)?;
    let url = format!("https://github.com/{}/archive/refs/tags/v{}.tar.gz", repo, self.version);
    println!("📦 Using tarball url {}", url);

    let digest = fetcher.fetch_digest(&url, HashAlgorithm::Sha512)?;

    set_manifest_version(&self.manifest_path, &self.version)?;
    println!("✏️  Set version {} in {}", self.version, self.manifest_path.display());
    replace_portfile_digest(&self.portfile_path, &digest)?;
    println!("✏️  Updated SHA512 in {}", self.portfile_path.display());

    Ok(EditOutcome::Applied {
      files: vec![self.manifest_path.clone(), self.portfile_path.clone()],
    })
  }

  fn commit_message(&self) -> String {
    format!("[{}] Bump to {}", self.port, self.version)
  }

  /// Regenerate the version database and commit it separately
  fn post_commit(&self, vcs: &dyn VersionControl) -> BumpResult<()> {
    self.tool.add_version(&self.port)?;
    vcs.commit_all(&format!("[{}] Update version database", self.port))
  }

  fn pr_title(&self) -> Option<String> {
    Some(self.commit_message())
  }

  fn pr_body(&self) -> String {
    PR_TEMPLATE.to_string()
  }
}

/// Run the vcpkg bump command
pub fn run_vcpkg(args: VcpkgArgs) -> BumpResult<()> {
  let cwd = std::env::current_dir()?;
  let git = SystemGit::open(&cwd)?;
  let root = git.work_tree().to_path_buf();
  let config = BumpConfig::load_or_default(&root)?;

  if semver::Version::parse(&args.version).is_err() {
    println!("⚠️  '{}' is not a semantic version; using it verbatim", args.version);
  }

  let port_dir = root.join(PORTS_DIR).join(&args.port);
  let manifest_path = port_dir.join("vcpkg.json");
  if !manifest_path.exists() {
    return Err(BumpError::Metadata(MetadataError::NotFound { path: manifest_path }));
  }

  let options = WorkflowOptions {
    package: args.port.clone(),
    version: args.version.clone(),
    branch: args.branch,
    prefix: config.prefix(args.prefix),
    trunk: config.trunk(args.trunk),
    push_remote: config.push_remote(args.push_remote),
    rebase_remote: config.rebase_remote(args.rebase_remote),
    no_build: args.no_build,
    no_pr: args.no_pr,
  };

  let target = VcpkgTarget {
    port: args.port.clone(),
    version: args.version.clone(),
    manifest_path,
    portfile_path: port_dir.join("portfile.cmake"),
    tool: VcpkgTool { root: root.clone() },
  };

  let fetcher = HttpFetcher::new()?;
  let builder = VcpkgBuilder {
    tool: VcpkgTool { root },
    port: args.port.clone(),
  };
  let forge = GhForge;

  let workflow = Workflow {
    vcs: &git as &dyn VersionControl,
    fetcher: &fetcher,
    builder: &builder,
    forge: &forge,
  };

  match workflow.run(&options, &target)? {
    WorkflowOutcome::Completed { branch } => {
      println!("✅ {} bumped to {} on {}", args.port, args.version, branch);
    }
    WorkflowOutcome::AlreadyPresent => {}
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  struct FixedFetcher {
    digest: String,
  }

  impl ArchiveFetcher for FixedFetcher {
    fn fetch_digest(&self, _url: &str, _algorithm: HashAlgorithm) -> BumpResult<String> {
      Ok(self.digest.clone())
    }
  }

  fn port_tree(dir: &TempDir) -> VcpkgTarget {
    let port_dir = dir.path().join("ports").join("cpptrace");
    fs::create_dir_all(&port_dir).unwrap();

    fs::write(
      port_dir.join("vcpkg.json"),
      "{\n  \"name\": \"cpptrace\",\n  \"version\": \"1.0.0\"\n}\n",
    )
    .unwrap();
    fs::write(
      port_dir.join("portfile.cmake"),
      format!(
        "vcpkg_from_github(\n    REPO jeremy-rifkin/cpptrace\n    REF \"v${{VERSION}}\"\n    SHA512 {}\n)\n",
        "0".repeat(128)
      ),
    )
    .unwrap();

    VcpkgTarget {
      port: "cpptrace".to_string(),
      version: "1.0.1".to_string(),
      manifest_path: port_dir.join("vcpkg.json"),
      portfile_path: port_dir.join("portfile.cmake"),
      tool: VcpkgTool {
        root: dir.path().to_path_buf(),
      },
    }
  }

  #[test]
  fn test_edit_updates_manifest_and_portfile() {
    let dir = TempDir::new().unwrap();
    let target = port_tree(&dir);
    let fetcher = FixedFetcher {
      digest: "f".repeat(128),
    };

    let outcome = target.edit(&fetcher).unwrap();
    let EditOutcome::Applied { files } = outcome else {
      panic!("expected an applied edit");
    };
    assert_eq!(files, vec![target.manifest_path.clone(), target.portfile_path.clone()]);

    let manifest = fs::read_to_string(&target.manifest_path).unwrap();
    assert!(manifest.contains("\"version\": \"1.0.1\""));

    let portfile = fs::read_to_string(&target.portfile_path).unwrap();
    assert!(portfile.contains(&format!("SHA512 {}", "f".repeat(128))));
    assert!(portfile.contains("REPO jeremy-rifkin/cpptrace"));
  }

  #[test]
  fn test_current_version_is_a_clean_noop() {
    let dir = TempDir::new().unwrap();
    let mut target = port_tree(&dir);
    target.version = "1.0.0".to_string();
    let fetcher = FixedFetcher {
      digest: "f".repeat(128),
    };

    let manifest_before = fs::read_to_string(&target.manifest_path).unwrap();
    let portfile_before = fs::read_to_string(&target.portfile_path).unwrap();

    let outcome = target.edit(&fetcher).unwrap();
    assert_eq!(outcome, EditOutcome::AlreadyPresent);
    assert_eq!(fs::read_to_string(&target.manifest_path).unwrap(), manifest_before);
    assert_eq!(fs::read_to_string(&target.portfile_path).unwrap(), portfile_before);
  }

  #[test]
  fn test_commit_and_pr_conventions() {
    let dir = TempDir::new().unwrap();
    let target = port_tree(&dir);
    assert_eq!(target.commit_message(), "[cpptrace] Bump to 1.0.1");
    assert_eq!(target.pr_title().as_deref(), Some("[cpptrace] Bump to 1.0.1"));
    assert!(target.pr_body().contains("SHA512s are updated"));
  }
}
