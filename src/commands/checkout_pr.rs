//! Checkout-fix-push on an external contributor's PR branch
//!
//! Adds the contributor's fork as a remote named after their user, pulls
//! the PR branch into a local tracking branch, and later pushes fixes
//! straight back to the fork (updating the PR) or tears the remote and
//! branch down again.

use crate::core::error::{BumpError, BumpResult};
use crate::core::vcs::{SystemGit, VersionControl};
use regex::Regex;
use std::sync::LazyLock;

static REPO_FROM_URL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[:/](?P<owner>[^/]+)/(?P<repo>[^/]+?)(\.git)?$").expect("remote url pattern"));

/// CLI arguments for `portbump checkout-pr`
pub struct CheckoutPrArgs {
  pub user: String,
  pub branch: String,
  pub local: Option<String>,
  pub push: bool,
  pub cleanup: bool,
}

/// Extract the repository name out of a remote URL
///
/// Handles both SSH (`git@host:owner/repo.git`) and HTTPS
/// (`https://host/owner/repo`) forms.
fn repo_name_from_url(url: &str) -> BumpResult<String> {
  REPO_FROM_URL
    .captures(url)
    .map(|captures| captures["repo"].to_string())
    .ok_or_else(|| BumpError::message(format!("Cannot extract repository name from remote URL: {}", url)))
}

/// Run the checkout-pr command
pub fn run_checkout_pr(args: CheckoutPrArgs) -> BumpResult<()> {
  if args.push && args.cleanup {
    return Err(BumpError::message("Specify only one of --push and --cleanup"));
  }

  let cwd = std::env::current_dir()?;
  let git = SystemGit::open(&cwd)?;
  let local_branch = args.local.unwrap_or_else(|| format!("{}-{}", args.user, args.branch));

  if args.push {
    println!("🚀 Pushing HEAD to {}/{}", args.user, args.branch);
    git.push_refspec(&args.user, &format!("HEAD:{}", args.branch))?;
    return Ok(());
  }

  if args.cleanup {
    // Step off the branch before deleting it.
    if git.current_branch()? == local_branch {
      let fallback = ["main", "master"]
        .into_iter()
        .find(|candidate| git.branch_exists(candidate).unwrap_or(false));
      match fallback {
        Some(trunk) => git.checkout(trunk)?,
        None => {
          return Err(BumpError::with_help(
            "Neither 'main' nor 'master' exists",
            "Check out another branch manually before cleanup.",
          ));
        }
      }
    }

    println!("🧹 Removing branch '{}' and remote '{}'", local_branch, args.user);
    git.delete_branch(&local_branch)?;
    git.remove_remote(&args.user)?;
    return Ok(());
  }

  let repo = repo_name_from_url(&git.remote_url("origin")?)?;
  git.add_remote(&args.user, &format!("git@github.com:{}/{}.git", args.user, repo))?;

  println!("⬇️  Fetching {}/{} into {}", args.user, args.branch, local_branch);
  git.fetch_refspec(&args.user, &format!("{}:{}", args.branch, local_branch))?;
  git.checkout(&local_branch)?;

  println!();
  println!("✅ All set!");
  println!("  • You are now on '{}', tracking '{}/{}'.", local_branch, args.user, args.branch);
  println!("  • Make your edits and commit, then run:");
  println!("      portbump checkout-pr {} {} --push", args.user, args.branch);
  Ok(())
}
