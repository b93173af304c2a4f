//! Integration test suite for portbump
//!
//! Everything runs against real git repositories with local bare remotes;
//! no test touches the network. Runs that would need to download an
//! archive (an actual version bump) are covered by the unit tests with a
//! fake fetcher; here we exercise the paths that stop before the fetch.

mod helpers;
mod test_conan;
mod test_vcpkg;
