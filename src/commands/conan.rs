//! Conan recipe bump command
//!
//! Replaces the manual loop: sync trunk, branch, add the new version to
//! `sources.toml` (and the `versions.toml` index), `conan create`,
//! commit, push, PR.

use crate::core::builder::ConanBuilder;
use crate::core::config::BumpConfig;
use crate::core::error::{BumpError, BumpResult, MetadataError};
use crate::core::fetch::{ArchiveFetcher, HashAlgorithm, HttpFetcher};
use crate::core::forge::GhForge;
use crate::core::sources::{IndexOutcome, SourcesDoc, UpsertOutcome, VersionIndex};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::core::version_pattern::derive_url;
use crate::core::workflow::{BumpTarget, EditOutcome, Workflow, WorkflowOptions, WorkflowOutcome};
use std::path::{Path, PathBuf};

const RECIPES_DIR: &str = "recipes";
const DEFAULT_FOLDER: &str = "all";

const PR_TEMPLATE: &str = "\
### Summary
Changes to recipe:  **{recipe}/{version}**

New upstream release

---
- [x] Read the [contributing guidelines](https://github.com/conan-io/conan-center-index/blob/master/CONTRIBUTING.md)
- [x] Checked that this PR is not a duplicate
- [x] Tested locally with at least one configuration using a recent version of Conan
";

/// CLI arguments for `portbump conan`
pub struct ConanArgs {
  pub recipe: String,
  pub version: String,
  pub repo_url: Option<String>,
  pub prefix: Option<String>,
  pub branch: Option<String>,
  pub trunk: Option<String>,
  pub push_remote: Option<String>,
  pub rebase_remote: Option<String>,
  pub no_build: bool,
  pub no_pr: bool,
}

/// The Conan half of the workflow: edits `sources.toml` and the
/// companion `versions.toml`, verifies with `conan create`
struct ConanTarget {
  recipe: String,
  version: String,
  sources_path: PathBuf,
  index_path: PathBuf,
  repo_url: Option<String>,
}

impl BumpTarget for ConanTarget {
  fn edit(&self, fetcher: &dyn ArchiveFetcher) -> BumpResult<EditOutcome> {
    let mut sources = SourcesDoc::load(&self.sources_path)?;

    // The idempotency check runs before the network fetch: a re-run for
    // a recorded version never downloads anything.
    if sources.contains(&self.version) {
      return Ok(EditOutcome::AlreadyPresent);
    }

    let url = match &self.repo_url {
      Some(repo) => format!("{}/archive/refs/tags/v{}.tar.gz", repo.trim_end_matches('/'), self.version),
      None => derive_url(&sources.first_url()?, &self.version)?,
    };
    println!("📦 Using tarball url {}", url);

    let digest = fetcher.fetch_digest(&url, HashAlgorithm::Sha256)?;

    let outcome = sources.upsert_version(&self.version, &url, HashAlgorithm::Sha256.field_name(), &digest)?;
    debug_assert_eq!(outcome, UpsertOutcome::Added);
    sources.save()?;
    println!("✏️  Added {} to {}", self.version, self.sources_path.display());

    let mut files = vec![self.sources_path.clone()];
    if let Some(mut index) = VersionIndex::load_if_exists(&self.index_path)? {
      match index.upsert_version(&self.version) {
        IndexOutcome::Added { inherited_from } => {
          index.save()?;
          files.push(self.index_path.clone());
          println!(
            "✏️  Added {} to {} (copied from {})",
            self.version,
            self.index_path.display(),
            inherited_from
          );
        }
        IndexOutcome::AlreadyPresent => {}
        IndexOutcome::Empty => {
          println!(
            "⚠️  {} has no existing versions; skipping the index update",
            self.index_path.display()
          );
        }
      }
    }

    Ok(EditOutcome::Applied { files })
  }

  fn commit_message(&self) -> String {
    format!("{}: Bump to {}", self.recipe, self.version)
  }

  fn pr_body(&self) -> String {
    PR_TEMPLATE
      .replace("{recipe}", &self.recipe)
      .replace("{version}", &self.version)
  }
}

/// Resolve the sub-folder holding the buildable recipe
///
/// The companion index's most recent entry names it; a missing index or
/// a missing field falls back to the canonical `all`, the latter with a
/// warning so the default never passes silently.
fn resolve_folder(recipe: &str, index_path: &Path) -> BumpResult<String> {
  let Some(index) = VersionIndex::load_if_exists(index_path)? else {
    return Ok(DEFAULT_FOLDER.to_string());
  };

  if index.is_empty() {
    return Ok(DEFAULT_FOLDER.to_string());
  }

  match index.latest_folder() {
    Some(folder) => Ok(folder),
    None => {
      let latest = index.latest_version().unwrap_or_default();
      println!(
        "⚠️  {}: no folder recorded for {} {}; using '{}'",
        index_path.display(),
        recipe,
        latest,
        DEFAULT_FOLDER
      );
      Ok(DEFAULT_FOLDER.to_string())
    }
  }
}

/// Run the conan bump command
pub fn run_conan(args: ConanArgs) -> BumpResult<()> {
  let cwd = std::env::current_dir()?;
  let git = SystemGit::open(&cwd)?;
  let root = git.work_tree().to_path_buf();
  let config = BumpConfig::load_or_default(&root)?;

  if semver::Version::parse(&args.version).is_err() {
    println!("⚠️  '{}' is not a semantic version; using it verbatim", args.version);
  }

  let recipe_dir = root.join(RECIPES_DIR).join(&args.recipe);
  let index_path = recipe_dir.join("versions.toml");
  let folder = resolve_folder(&args.recipe, &index_path)?;

  let subdir = recipe_dir.join(&folder);
  let sources_path = subdir.join("sources.toml");
  if !sources_path.exists() {
    return Err(BumpError::Metadata(MetadataError::NotFound { path: sources_path }));
  }

  let options = WorkflowOptions {
    package: args.recipe.clone(),
    version: args.version.clone(),
    branch: args.branch,
    prefix: config.prefix(args.prefix),
    trunk: config.trunk(args.trunk),
    push_remote: config.push_remote(args.push_remote),
    rebase_remote: config.rebase_remote(args.rebase_remote),
    no_build: args.no_build,
    no_pr: args.no_pr,
  };

  let target = ConanTarget {
    recipe: args.recipe.clone(),
    version: args.version.clone(),
    sources_path,
    index_path,
    repo_url: args.repo_url,
  };

  let fetcher = HttpFetcher::new()?;
  let builder = ConanBuilder {
    conanfile: subdir.join("conanfile.py"),
    version: args.version.clone(),
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
      println!("✅ {} bumped to {} on {}", args.recipe, args.version, branch);
    }
    WorkflowOutcome::AlreadyPresent => {}
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  struct FixedFetcher {
    digest: String,
  }

  impl ArchiveFetcher for FixedFetcher {
    fn fetch_digest(&self, _url: &str, _algorithm: HashAlgorithm) -> BumpResult<String> {
      Ok(self.digest.clone())
    }
  }

  fn recipe_tree(dir: &TempDir) -> (PathBuf, PathBuf) {
    let recipe_dir = dir.path().join("recipes").join("cpptrace");
    let subdir = recipe_dir.join("all");
    fs::create_dir_all(&subdir).unwrap();

    let sources_path = subdir.join("sources.toml");
    fs::write(
      &sources_path,
      format!(
        "[sources]\n\"1.0.0\" = {{ url = \"https://x/archive/v1.0.0.tar.gz\", sha256 = \"{}\" }}\n",
        "d".repeat(64)
      ),
    )
    .unwrap();

    fs::write(
      recipe_dir.join("versions.toml"),
      "[versions]\n\"1.0.0\" = { folder = \"all\" }\n",
    )
    .unwrap();

    (sources_path, recipe_dir.join("versions.toml"))
  }

  fn target(sources_path: &Path, index_path: &Path) -> ConanTarget {
    ConanTarget {
      recipe: "cpptrace".to_string(),
      version: "1.0.1".to_string(),
      sources_path: sources_path.to_path_buf(),
      index_path: index_path.to_path_buf(),
      repo_url: None,
    }
  }

  #[test]
  fn test_end_to_end_edit_derives_inserts_and_inherits() {
    let dir = TempDir::new().unwrap();
    let (sources_path, index_path) = recipe_tree(&dir);
    let fetcher = FixedFetcher {
      digest: "e".repeat(64),
    };

    let outcome = target(&sources_path, &index_path).edit(&fetcher).unwrap();
    let EditOutcome::Applied { files } = outcome else {
      panic!("expected an applied edit");
    };
    assert_eq!(files, vec![sources_path.clone(), index_path.clone()]);

    let sources = fs::read_to_string(&sources_path).unwrap();
    let new_pos = sources.find("\"1.0.1\"").unwrap();
    let old_pos = sources.find("\"1.0.0\"").unwrap();
    assert!(new_pos < old_pos, "new version must come first");
    assert!(sources.contains("https://x/archive/v1.0.1.tar.gz"), "derived URL recorded");
    assert!(sources.contains(&"e".repeat(64)), "fetched digest recorded");
    // The 1.0.0 entry keeps both of its original fields untouched.
    assert!(sources.contains("https://x/archive/v1.0.0.tar.gz"));
    assert!(sources.contains(&"d".repeat(64)));

    let index = fs::read_to_string(&index_path).unwrap();
    let idx_new = index.find("\"1.0.1\"").unwrap();
    let idx_old = index.find("\"1.0.0\"").unwrap();
    assert!(idx_new < idx_old);
    assert_eq!(index.matches("folder = \"all\"").count(), 2, "metadata inherited");
  }

  #[test]
  fn test_second_run_is_a_clean_noop() {
    let dir = TempDir::new().unwrap();
    let (sources_path, index_path) = recipe_tree(&dir);
    let fetcher = FixedFetcher {
      digest: "e".repeat(64),
    };

    let target = target(&sources_path, &index_path);
    target.edit(&fetcher).unwrap();
    let after_first = fs::read_to_string(&sources_path).unwrap();
    let index_after_first = fs::read_to_string(&index_path).unwrap();

    let outcome = target.edit(&fetcher).unwrap();
    assert_eq!(outcome, EditOutcome::AlreadyPresent);
    assert_eq!(fs::read_to_string(&sources_path).unwrap(), after_first);
    assert_eq!(fs::read_to_string(&index_path).unwrap(), index_after_first);
  }

  #[test]
  fn test_repo_url_override_skips_derivation() {
    let dir = TempDir::new().unwrap();
    let (sources_path, index_path) = recipe_tree(&dir);
    let fetcher = FixedFetcher {
      digest: "e".repeat(64),
    };

    let mut target = target(&sources_path, &index_path);
    target.repo_url = Some("https://github.com/jeremy-rifkin/cpptrace/".to_string());
    target.edit(&fetcher).unwrap();

    let sources = fs::read_to_string(&sources_path).unwrap();
    assert!(sources.contains("https://github.com/jeremy-rifkin/cpptrace/archive/refs/tags/v1.0.1.tar.gz"));
  }

  #[test]
  fn test_missing_index_is_tolerated() {
    let dir = TempDir::new().unwrap();
    let (sources_path, index_path) = recipe_tree(&dir);
    fs::remove_file(&index_path).unwrap();
    let fetcher = FixedFetcher {
      digest: "e".repeat(64),
    };

    let outcome = target(&sources_path, &index_path).edit(&fetcher).unwrap();
    let EditOutcome::Applied { files } = outcome else {
      panic!("expected an applied edit");
    };
    assert_eq!(files, vec![sources_path.clone()], "only sources.toml staged");
  }

  #[test]
  fn test_empty_index_is_skipped_not_fabricated() {
    let dir = TempDir::new().unwrap();
    let (sources_path, index_path) = recipe_tree(&dir);
    fs::write(&index_path, "[versions]\n").unwrap();
    let fetcher = FixedFetcher {
      digest: "e".repeat(64),
    };

    let outcome = target(&sources_path, &index_path).edit(&fetcher).unwrap();
    let EditOutcome::Applied { files } = outcome else {
      panic!("expected an applied edit");
    };
    assert_eq!(files, vec![sources_path.clone()]);
    assert_eq!(fs::read_to_string(&index_path).unwrap(), "[versions]\n");
  }

  #[test]
  fn test_folder_resolution() {
    let dir = TempDir::new().unwrap();
    let index_path = dir.path().join("versions.toml");

    // No index at all: canonical default, silently.
    assert_eq!(resolve_folder("pkg", &index_path).unwrap(), "all");

    // Index names a different folder.
    fs::write(&index_path, "[versions]\n\"2.0\" = { folder = \"cmake\" }\n").unwrap();
    assert_eq!(resolve_folder("pkg", &index_path).unwrap(), "cmake");

    // Index entry without a folder field: explicit default.
    fs::write(&index_path, "[versions]\n\"2.0\" = { deprecated = false }\n").unwrap();
    assert_eq!(resolve_folder("pkg", &index_path).unwrap(), "all");
  }
}
