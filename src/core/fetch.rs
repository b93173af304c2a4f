//! Archive download and digesting
//!
//! One synchronous GET per archive, streamed through the digest in
//! fixed-size chunks so multi-hundred-megabyte tarballs never sit in
//! memory. No retries: a flaky network is the operator's to re-run.

use crate::core::error::{BumpError, BumpResult, FetchError};
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(600);
const CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithm for archive verification
///
/// Conan-style recipes record SHA-256 (64 hex chars); Vcpkg-style
/// portfiles record SHA-512 (128 hex chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
  Sha256,
  Sha512,
}

impl HashAlgorithm {
  /// Length of the hex digest this algorithm produces
  pub fn hex_len(self) -> usize {
    match self {
      HashAlgorithm::Sha256 => 64,
      HashAlgorithm::Sha512 => 128,
    }
  }

  /// Metadata field name the digest is recorded under
  pub fn field_name(self) -> &'static str {
    match self {
      HashAlgorithm::Sha256 => "sha256",
      HashAlgorithm::Sha512 => "sha512",
    }
  }
}

/// Capability interface for fetching and digesting an archive
///
/// The workflow driver only sees this trait; tests substitute a fake that
/// returns a canned digest without touching the network.
pub trait ArchiveFetcher {
  /// Download `url` and return the hex digest of the body
  fn fetch_digest(&self, url: &str, algorithm: HashAlgorithm) -> BumpResult<String>;
}

/// Stream a reader through the requested digest
pub fn digest_reader(reader: &mut dyn Read, algorithm: HashAlgorithm) -> std::io::Result<String> {
  fn run<D: Digest>(reader: &mut dyn Read, mut hasher: D) -> std::io::Result<D> {
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
      let n = reader.read(&mut chunk)?;
      if n == 0 {
        break;
      }
      hasher.update(&chunk[..n]);
    }
    Ok(hasher)
  }

  match algorithm {
    HashAlgorithm::Sha256 => Ok(format!("{:x}", run(reader, Sha256::new())?.finalize())),
    HashAlgorithm::Sha512 => Ok(format!("{:x}", run(reader, Sha512::new())?.finalize())),
  }
}

/// HTTP fetcher over rustls
pub struct HttpFetcher {
  client: reqwest::blocking::Client,
}

impl HttpFetcher {
  pub fn new() -> BumpResult<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(FETCH_TIMEOUT)
      .user_agent(concat!("portbump/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| BumpError::message(format!("Failed to build HTTP client: {}", e)))?;
    Ok(Self { client })
  }
}

impl ArchiveFetcher for HttpFetcher {
  fn fetch_digest(&self, url: &str, algorithm: HashAlgorithm) -> BumpResult<String> {
    let response = self.client.get(url).send().map_err(|source| {
      BumpError::Fetch(FetchError::Transport {
        url: url.to_string(),
        source,
      })
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(BumpError::Fetch(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      }));
    }

    let mut body = response;
    digest_reader(&mut body, algorithm).map_err(BumpError::Io)
  }
}
