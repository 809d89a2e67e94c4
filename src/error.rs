//! Error types for rgup operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rgup operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for all rgup operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Environment/precondition errors
    #[error("Preflight error: {0}")]
    Preflight(#[from] PreflightError),

    /// Repository inspection and sync errors
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Toolchain update errors
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    /// Build/test pipeline errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Environment/precondition errors
#[derive(Error, Debug)]
pub enum PreflightError {
    /// Required external executable not found on PATH
    #[error("Required executable '{name}' not found on PATH")]
    MissingExecutable {
        /// Executable name
        name: String,
    },

    /// The git client is too old for the commands this tool relies on
    #[error("git {found} is too old; version {required}+ is required")]
    GitTooOld {
        /// Version reported by `git --version`
        found: String,
        /// Minimum supported major version
        required: u32,
    },

    /// Could not parse the git client version
    #[error("Could not parse git version from '{output}'")]
    UnparseableGitVersion {
        /// Raw `git --version` output
        output: String,
    },

    /// Checkout directory missing or not the expected project root
    #[error("'{path}' is not a usable checkout: {reason}")]
    BadCheckout {
        /// Directory that failed validation
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Repository inspection and sync errors
#[derive(Error, Debug)]
pub enum RepoError {
    /// A git command exited non-zero
    #[error("git {command} failed: {reason}")]
    CommandFailed {
        /// Subcommand that failed
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// HEAD has no configured upstream and none was supplied
    #[error("No upstream configured for branch '{branch}'. Pass one with --upstream remote/branch.")]
    UpstreamNotConfigured {
        /// Local branch name
        branch: String,
    },

    /// Local and upstream histories have both moved independently
    #[error(
        "Local branch and '{upstream}' have diverged (both have unique commits). Resolve manually."
    )]
    Diverged {
        /// Upstream specifier
        upstream: String,
    },

    /// Pull with rebase failed (network, auth, or conflict)
    #[error("git pull --rebase from '{upstream}' failed: {reason}")]
    PullFailed {
        /// Upstream specifier
        upstream: String,
        /// Reason for the error
        reason: String,
    },
}

/// Toolchain update errors
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// Could not launch the toolchain updater at all
    #[error("Failed to launch 'rustup update': {reason}")]
    LaunchFailed {
        /// Reason for the error
        reason: String,
    },

    /// A stage of the update-and-scan pipeline failed
    #[error("Toolchain update pipeline stage {index} ({stage}) failed: {reason}")]
    StageFailed {
        /// Zero-based stage index within the pipeline
        index: usize,
        /// Human-readable stage name
        stage: String,
        /// Reason for the error
        reason: String,
    },
}

/// Build/test pipeline errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Compilation failed
    #[error("cargo build failed ({status})")]
    BuildFailed {
        /// Exit status of the build
        status: String,
    },

    /// Test suite failed
    #[error("cargo test failed ({status})")]
    TestsFailed {
        /// Exit status of the test run
        status: String,
    },

    /// The expected executable is missing after a successful build
    #[error("Expected executable missing after build: {path}")]
    TargetMissing {
        /// Path where the executable was expected
        path: PathBuf,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl SyncError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            SyncError::Preflight(PreflightError::MissingExecutable { name }) => vec![
                format!("Install '{name}' and ensure it is on PATH"),
                "Re-run from a fresh shell so PATH changes take effect".to_string(),
            ],
            SyncError::Preflight(PreflightError::BadCheckout { path, .. }) => vec![
                format!("Clone the project first: git clone <url> {}", path.display()),
                "Point at an existing checkout with --dir".to_string(),
            ],
            SyncError::Repo(RepoError::Diverged { upstream }) => vec![
                format!("Inspect both histories: git log --oneline --graph HEAD {upstream}"),
                "Rebase or merge manually, then re-run".to_string(),
            ],
            SyncError::Repo(RepoError::PullFailed { .. }) => vec![
                "Check network connectivity and remote authentication".to_string(),
                "If a rebase is stuck: git rebase --abort to back out".to_string(),
            ],
            SyncError::Repo(RepoError::UpstreamNotConfigured { branch }) => vec![
                format!(
                    "Set a tracking branch: git branch --set-upstream-to=origin/master {branch}"
                ),
                "Or pass --upstream remote/branch explicitly".to_string(),
            ],
            SyncError::Build(BuildError::BuildFailed { .. }) => vec![
                "Review the compiler output above".to_string(),
                "Retry after 'cargo clean' if the target directory looks corrupted".to_string(),
            ],
            SyncError::Build(BuildError::TestsFailed { .. }) => vec![
                "Review the failing tests above; the previous executable is left untouched"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Process exit code for this error. Every fatal path exits 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
