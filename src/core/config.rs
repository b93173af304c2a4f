//! Workspace configuration for portbump
//!
//! Everything works with zero configuration; `bump.toml` at the monorepo
//! root only overrides the built-in defaults, and CLI flags override
//! both.

use crate::core::error::{BumpResult, ResultExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "jr";
pub const DEFAULT_TRUNK: &str = "master";
pub const DEFAULT_PUSH_REMOTE: &str = "origin";
pub const DEFAULT_REBASE_REMOTE: &str = "upstream";

/// Configuration for portbump
/// Searched in order: bump.toml, .bump.toml, .config/bump.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BumpConfig {
  #[serde(default)]
  pub defaults: Defaults,
}

/// Overridable workflow defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
  /// Branch prefix (default: jr)
  #[serde(default)]
  pub prefix: Option<String>,

  /// Trunk branch the upstream advances (default: master)
  #[serde(default)]
  pub trunk: Option<String>,

  /// Remote to push bump branches to (default: origin)
  #[serde(default)]
  pub push_remote: Option<String>,

  /// Remote to rebase the trunk against (default: upstream)
  #[serde(default)]
  pub rebase_remote: Option<String>,
}

impl BumpConfig {
  /// Find config file in search order
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = [
      root.join("bump.toml"),
      root.join(".bump.toml"),
      root.join(".config").join("bump.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load configuration, falling back to built-in defaults when no file
  /// exists
  pub fn load_or_default(root: &Path) -> BumpResult<Self> {
    let Some(config_path) = Self::find_config_path(root) else {
      return Ok(Self::default());
    };

    let content =
      fs::read_to_string(&config_path).with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: BumpConfig =
      toml_edit::de::from_str(&content).with_context(|| format!("Failed to parse {}", config_path.display()))?;
    Ok(config)
  }

  /// Effective branch prefix: flag, then config, then default
  pub fn prefix(&self, flag: Option<String>) -> String {
    flag
      .or_else(|| self.defaults.prefix.clone())
      .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
  }

  /// Effective trunk branch
  pub fn trunk(&self, flag: Option<String>) -> String {
    flag
      .or_else(|| self.defaults.trunk.clone())
      .unwrap_or_else(|| DEFAULT_TRUNK.to_string())
  }

  /// Effective push remote
  pub fn push_remote(&self, flag: Option<String>) -> String {
    flag
      .or_else(|| self.defaults.push_remote.clone())
      .unwrap_or_else(|| DEFAULT_PUSH_REMOTE.to_string())
  }

  /// Effective rebase remote
  pub fn rebase_remote(&self, flag: Option<String>) -> String {
    flag
      .or_else(|| self.defaults.rebase_remote.clone())
      .unwrap_or_else(|| DEFAULT_REBASE_REMOTE.to_string())
  }
}
