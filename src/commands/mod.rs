//! CLI commands for portbump
//!
//! - **conan**: bump a Conan-style recipe (sources.toml + versions.toml)
//! - **vcpkg**: bump a Vcpkg-style port (vcpkg.json + portfile.cmake)
//! - **checkout_pr**: work on an external contributor's PR branch

pub mod checkout_pr;
pub mod conan;
pub mod vcpkg;

pub use checkout_pr::{CheckoutPrArgs, run_checkout_pr};
pub use conan::{ConanArgs, run_conan};
pub use vcpkg::{VcpkgArgs, run_vcpkg};
