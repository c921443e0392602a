//! Error types for Inkpress
//!
//! Uses `thiserror` for library errors; the binary maps each error to a
//! process exit status via [`InkpressError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Inkpress operations
pub type InkpressResult<T> = Result<T, InkpressError>;

/// Main error type for Inkpress operations
#[derive(Error, Debug)]
pub enum InkpressError {
    /// Configuration file present but unusable
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Content directory missing
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// No front-matter found (missing `---` delimiters)
    #[error("no front-matter found in {file} - file must start with '---'")]
    NoFrontMatter { file: PathBuf },

    /// Front-matter not properly closed
    #[error("unclosed front-matter in {file} - missing closing '---'")]
    UnclosedFrontMatter { file: PathBuf },

    /// Invalid front-matter YAML
    #[error("invalid front-matter in {file}: {message}")]
    InvalidFrontMatter { file: PathBuf, message: String },

    /// A pipeline command could not be started at all
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The site generator exited with a non-zero status
    #[error("site generator exited with status {code}")]
    Generator { code: i32 },

    /// The preview server exited with a non-zero status
    #[error("preview server exited with status {code}")]
    Preview { code: i32 },

    /// A git operation against the deploy target failed
    #[error("git {op} exited with status {code}")]
    Git { op: String, code: i32 },

    /// Deploy target directory exists but is not a git working copy
    #[error("deploy target {path} exists but is not a git repository")]
    TargetNotARepo { path: PathBuf },

    /// Deploy target must be cloned but no repository URL is configured
    #[error("deploy target {path} does not exist and [deploy] repo is not set")]
    MissingDeployRepo { path: PathBuf },

    /// Domain marker file is configured but absent from the blog root
    #[error("domain file not found: {path}")]
    MissingDomainFile { path: PathBuf },

    /// Pipeline aborted by Ctrl+C between steps
    #[error("interrupted")]
    Interrupted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InkpressError {
    /// Process exit status for this error.
    ///
    /// The first non-zero exit code from an underlying command propagates
    /// unchanged; an interrupt maps to 130; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            InkpressError::Generator { code }
            | InkpressError::Preview { code }
            | InkpressError::Git { code, .. } => *code,
            InkpressError::Interrupted => 130,
            _ => 1,
        }
    }
}
