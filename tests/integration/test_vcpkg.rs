//! Integration tests for the vcpkg bump workflow

use crate::helpers::{TestWorkspace, run_portbump};
use anyhow::Result;

#[test]
fn test_current_version_is_a_clean_noop() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_port("cpptrace", "1.0.1", &"0".repeat(128))?;

  let manifest_before = ws.read_file("ports/cpptrace/vcpkg.json")?;
  let portfile_before = ws.read_file("ports/cpptrace/portfile.cmake")?;

  let output = run_portbump(&ws.path, &["vcpkg", "cpptrace", "1.0.1", "--no-build", "--no-pr"])?;

  assert!(
    output.status.success(),
    "idempotent re-run must exit 0\nstdout: {}\nstderr: {}",
    String::from_utf8_lossy(&output.stdout),
    String::from_utf8_lossy(&output.stderr)
  );
  assert_eq!(ws.read_file("ports/cpptrace/vcpkg.json")?, manifest_before);
  assert_eq!(ws.read_file("ports/cpptrace/portfile.cmake")?, portfile_before);
  Ok(())
}

#[test]
fn test_unknown_port_fails_with_user_error() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_portbump(&ws.path, &["vcpkg", "no-such-port", "1.0.0", "--no-build", "--no-pr"])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("not found"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_existing_branch_is_fatal() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_port("fmt", "10.2.1", &"0".repeat(128))?;
  ws.create_branch("jr/fmt-10.2.1")?;

  let output = run_portbump(&ws.path, &["vcpkg", "fmt", "10.2.1", "--no-build", "--no-pr"])?;

  assert_eq!(output.status.code(), Some(2));
  assert_eq!(ws.current_branch()?, "master");
  Ok(())
}
