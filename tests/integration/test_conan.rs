//! Integration tests for the conan bump workflow

use crate::helpers::{TestWorkspace, run_portbump};
use anyhow::Result;

#[test]
fn test_recorded_version_is_a_clean_noop() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_recipe("cpptrace", "1.0.1", &"d".repeat(64))?;

  let before = ws.read_file("recipes/cpptrace/all/sources.toml")?;
  let output = run_portbump(&ws.path, &["conan", "cpptrace", "1.0.1", "--no-build", "--no-pr"])?;

  assert!(
    output.status.success(),
    "idempotent re-run must exit 0\nstdout: {}\nstderr: {}",
    String::from_utf8_lossy(&output.stdout),
    String::from_utf8_lossy(&output.stderr)
  );
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("nothing to commit"), "stdout: {}", stdout);

  // No file rewrite, no spurious diff to commit.
  assert_eq!(ws.read_file("recipes/cpptrace/all/sources.toml")?, before);
  Ok(())
}

#[test]
fn test_existing_branch_is_fatal() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_recipe("cpptrace", "1.0.1", &"d".repeat(64))?;
  ws.create_branch("jr/cpptrace-1.0.1")?;

  let output = run_portbump(&ws.path, &["conan", "cpptrace", "1.0.1", "--no-build", "--no-pr"])?;

  assert_eq!(output.status.code(), Some(2), "git-stage failures exit 2");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("already exists"), "stderr: {}", stderr);

  // The failure happened before any edit: still on trunk, tree clean.
  assert_eq!(ws.current_branch()?, "master");
  Ok(())
}

#[test]
fn test_unknown_recipe_fails_before_touching_git_state() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_portbump(&ws.path, &["conan", "no-such-recipe", "1.0.0", "--no-build", "--no-pr"])?;

  assert_eq!(output.status.code(), Some(1), "user errors exit 1");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("not found"), "stderr: {}", stderr);
  assert_eq!(ws.current_branch()?, "master");
  Ok(())
}

#[test]
fn test_explicit_branch_name_is_used_for_the_noop_run() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_recipe("zlib", "1.3.1", &"a".repeat(64))?;

  let output = run_portbump(
    &ws.path,
    &["conan", "zlib", "1.3.1", "--branch", "fix/zlib-refresh", "--no-build", "--no-pr"],
  )?;

  assert!(output.status.success());
  // The no-op aborts after branching, leaving the named branch checked out.
  assert_eq!(ws.current_branch()?, "fix/zlib-refresh");
  Ok(())
}
