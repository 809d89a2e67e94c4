//! # rgup
//!
//! Workstation automation for a local ripgrep checkout: keep the source in
//! sync with its upstream, keep the Rust toolchain current, and rebuild the
//! release binary only when one of those actually changed (or `--force`).
//!
//! The core is a small decision procedure, not a build system: classify the
//! local branch against its upstream, combine that with the toolchain-update
//! outcome and the forced-rebuild flag into a rebuild-reason count, and run
//! the build/test/strip/report pipeline iff the count is nonzero.
//!
//! ## Usage
//!
//! ```bash
//! rgup                  # sync + rebuild only if needed
//! rgup -f               # force a rebuild
//! rgup -d ~/src/ripgrep -u origin/master
//! rgup -v 2 -p          # detailed output, keep debug symbols
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod decision;
pub mod error;
pub mod pipeline;
pub mod preflight;
pub mod repo;
pub mod toolchain;

// Re-export main types for public API
pub use cli::{Args, OutputManager, RuntimeConfig, StripPolicy};
pub use decision::{ConfirmRebuild, RebuildReasons, Relation, SyncAction, TerminalConfirm};
pub use error::{BuildError, CliError, PreflightError, RepoError, Result, SyncError, ToolchainError};
pub use repo::{Repo, RepoSnapshot};
pub use toolchain::{StageReport, ToolchainOutcome};
