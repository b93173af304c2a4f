//! Core engine for portbump operations
//!
//! This module contains the building blocks of the version-bump pipeline:
//!
//! - **builder**: local build verification (conan create / vcpkg install)
//! - **config**: optional bump.toml defaults
//! - **error**: error types with contextual help messages and exit codes
//! - **fetch**: archive download and digesting
//! - **forge**: pull-request creation through the forge CLI
//! - **manifest**: vcpkg.json and portfile.cmake editing
//! - **sources**: round-trip editing of recipe source metadata
//! - **vcs**: git operations abstraction (SystemGit)
//! - **version_pattern**: version-substring detection in archive URLs
//! - **workflow**: the staged release workflow driver

pub mod builder;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forge;
pub mod manifest;
pub mod sources;
pub mod vcs;
pub mod version_pattern;
pub mod workflow;
