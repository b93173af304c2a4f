//! Error types for portbump with contextual messages and exit codes
//!
//! One top-level error wraps a category per stage of the bump pipeline.
//! Every fatal error maps to a process exit code; recoverable conditions
//! (a version that is already recorded, a missing forge CLI) are not
//! errors and never reach this module.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for portbump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (bad recipe name, unrecognizable URL, config)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Build verification failure (recipe edited but not committed)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for portbump
#[derive(Debug)]
pub enum BumpError {
  /// Archive-URL derivation errors
  Url(UrlError),

  /// Archive download errors
  Fetch(FetchError),

  /// Git operation errors
  Git(GitError),

  /// Recipe/port metadata errors
  Metadata(MetadataError),

  /// Local build verification errors
  Build(BuildError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BumpError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BumpError::Message { message, context, help } => BumpError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => BumpError::Message {
        message: other.to_string(),
        context: Some(ctx_str),
        help: other.help_message(),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      BumpError::Url(_) => ExitCode::User,
      BumpError::Fetch(_) => ExitCode::System,
      BumpError::Git(_) => ExitCode::System,
      BumpError::Metadata(_) => ExitCode::User,
      BumpError::Build(_) => ExitCode::Validation,
      BumpError::Io(_) => ExitCode::System,
      BumpError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BumpError::Url(e) => e.help_message(),
      BumpError::Git(e) => e.help_message(),
      BumpError::Metadata(e) => e.help_message(),
      BumpError::Build(_) => Some("The edit is still in your working tree; fix the recipe and re-run, or discard with `git checkout -- .`".to_string()),
      BumpError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for BumpError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BumpError::Url(e) => write!(f, "{}", e),
      BumpError::Fetch(e) => write!(f, "{}", e),
      BumpError::Git(e) => write!(f, "{}", e),
      BumpError::Metadata(e) => write!(f, "{}", e),
      BumpError::Build(e) => write!(f, "{}", e),
      BumpError::Io(e) => write!(f, "I/O error: {}", e),
      BumpError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BumpError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BumpError::Io(e) => Some(e),
      BumpError::Fetch(FetchError::Transport { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for BumpError {
  fn from(err: io::Error) -> Self {
    BumpError::Io(err)
  }
}

impl From<String> for BumpError {
  fn from(msg: String) -> Self {
    BumpError::message(msg)
  }
}

impl From<&str> for BumpError {
  fn from(msg: &str) -> Self {
    BumpError::message(msg)
  }
}

impl From<toml_edit::TomlError> for BumpError {
  fn from(err: toml_edit::TomlError) -> Self {
    BumpError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for BumpError {
  fn from(err: toml_edit::de::Error) -> Self {
    BumpError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for BumpError {
  fn from(err: serde_json::Error) -> Self {
    BumpError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for BumpError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    BumpError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Archive-URL derivation errors
#[derive(Debug)]
pub enum UrlError {
  /// No version-shaped substring in the sample URL
  PatternNotFound { url: String },
}

impl UrlError {
  fn help_message(&self) -> Option<String> {
    match self {
      UrlError::PatternNotFound { .. } => {
        Some("Pass --repo-url to supply the archive location explicitly.".to_string())
      }
    }
  }
}

impl fmt::Display for UrlError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UrlError::PatternNotFound { url } => {
        write!(f, "Unrecognizable version pattern in URL: {}", url)
      }
    }
  }
}

/// Archive download errors
#[derive(Debug)]
pub enum FetchError {
  /// Server answered with a non-2xx status
  Status { url: String, status: u16 },

  /// Transport-level failure (DNS, TLS, timeout, ...)
  Transport { url: String, source: reqwest::Error },
}

impl fmt::Display for FetchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FetchError::Status { url, status } => {
        write!(f, "Download failed with HTTP {}: {}", status, url)
      }
      FetchError::Transport { url, source } => {
        write!(f, "Download failed: {}: {}", url, source)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Target branch already exists
  BranchExists { branch: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::BranchExists { branch } => Some(format!(
        "Delete it with `git branch -D {}` or pick another name with --branch.",
        branch
      )),
      GitError::RepoNotFound { path } => Some(format!(
        "Run portbump from the root of the package monorepo (no git repository at {}).",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::BranchExists { branch } => {
        write!(f, "Branch '{}' already exists", branch)
      }
    }
  }
}

/// Recipe/port metadata errors
#[derive(Debug)]
pub enum MetadataError {
  /// Expected metadata file is missing
  NotFound { path: PathBuf },

  /// Metadata file exists but cannot be used as-is
  Malformed { path: PathBuf, message: String },

  /// Sources document has no entries to derive from
  NoSources { path: PathBuf },
}

impl MetadataError {
  fn help_message(&self) -> Option<String> {
    match self {
      MetadataError::NotFound { .. } => Some("Check the package name and that you are at the monorepo root.".to_string()),
      MetadataError::NoSources { .. } => {
        Some("Add at least one version entry by hand, or pass --repo-url.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for MetadataError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MetadataError::NotFound { path } => {
        write!(f, "Metadata file not found: {}", path.display())
      }
      MetadataError::Malformed { path, message } => {
        write!(f, "Malformed metadata in {}: {}", path.display(), message)
      }
      MetadataError::NoSources { path } => {
        write!(f, "No source entries in {}", path.display())
      }
    }
  }
}

/// Local build verification errors
#[derive(Debug)]
pub enum BuildError {
  /// The ecosystem's build command exited non-zero
  VerificationFailed { command: String, code: Option<i32> },
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::VerificationFailed { command, code } => match code {
        Some(code) => write!(f, "Build verification failed (exit {}): {}", code, command),
        None => write!(f, "Build verification terminated by signal: {}", command),
      },
    }
  }
}

/// Result type alias for portbump
pub type BumpResult<T> = Result<T, BumpError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BumpResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BumpError>,
{
  fn context(self, ctx: impl Into<String>) -> BumpResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &BumpError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
