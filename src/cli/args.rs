//! Command line argument parsing and validation.
//!
//! The tool is designed to "just work" - run it with no arguments and it
//! syncs and rebuilds the default ripgrep checkout only when needed.

use clap::Parser;
use std::path::PathBuf;

/// Checkout directory used when `--dir` is not given, relative to `$HOME`.
const DEFAULT_CHECKOUT_SUBDIR: &str = "git/ripgrep";

/// Executable path inside the checkout produced by a release build.
pub const RELEASE_BINARY_SUBPATH: &str = "target/release/rg";

/// Keep a local ripgrep checkout synced with upstream and rebuilt on change
#[derive(Parser, Debug)]
#[command(
    name = "rgup",
    version,
    about = "Sync a ripgrep checkout with upstream and rebuild only when something changed",
    long_about = "Pulls upstream changes into a local ripgrep checkout, updates the Rust \
toolchain, and rebuilds/retests/strips the release binary only when the checkout, the \
toolchain, or a --force flag gives it a reason to.

Usage:
  rgup
  rgup -f
  rgup -d /path/to/ripgrep -u origin/master
  rgup -v 2 -p"
)]
pub struct Args {
    /// Force a rebuild even when nothing changed
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Local source-tree directory (default: <home>/git/ripgrep)
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Upstream as remote/branch (default: the configured tracking branch)
    #[arg(short = 'u', long = "upstream", value_name = "SPEC")]
    pub upstream: Option<String>,

    /// Keep debug symbols (default is to strip the built executable)
    #[arg(short = 'p', long = "no-strip")]
    pub no_strip: bool,

    /// Verbosity, a single digit 0-9 (0 quiet, 2+ detailed)
    #[arg(short = 'v', long = "verbosity", value_name = "DIGIT", default_value = "1")]
    pub verbosity: String,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency.
    ///
    /// Verbosity is validated here rather than by clap so that a bad value
    /// produces a usage diagnostic and exit code 1, not clap's exit code 2.
    pub fn validate(&self) -> Result<(), String> {
        let digit = self.verbosity.as_str();
        if digit.len() != 1 || !digit.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "verbosity must be a single digit 0-9, got '{digit}'"
            ));
        }

        if let Some(spec) = &self.upstream
            && crate::repo::split_upstream_spec(spec).is_none()
        {
            return Err(format!(
                "upstream must look like remote/branch, got '{spec}'"
            ));
        }

        Ok(())
    }

    /// Validated verbosity digit. Call only after `validate()` has passed.
    pub fn verbosity_level(&self) -> u8 {
        self.verbosity.parse().unwrap_or(1)
    }
}

/// Whether the built executable has its debug symbols removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripPolicy {
    /// Strip debug symbols after a successful build (default)
    Strip,
    /// Leave the executable as the build produced it
    Keep,
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Checkout directory to operate on
    pub checkout_dir: PathBuf,
    /// Expected compiled executable inside the checkout
    pub target_binary: PathBuf,
    /// Explicit upstream spec, if the user supplied one
    pub upstream: Option<String>,
    /// Force rebuild regardless of change detection
    pub force: bool,
    /// Strip-or-keep policy for the built executable
    pub strip: StripPolicy,
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration from validated arguments
    pub fn from_args(args: &Args) -> Self {
        let checkout_dir = args.dir.clone().unwrap_or_else(default_checkout_dir);
        let target_binary = checkout_dir.join(RELEASE_BINARY_SUBPATH);
        Self {
            checkout_dir,
            target_binary,
            upstream: args.upstream.clone(),
            force: args.force,
            strip: if args.no_strip {
                StripPolicy::Keep
            } else {
                StripPolicy::Strip
            },
            output: super::OutputManager::new(args.verbosity_level()),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

/// `<home>/git/ripgrep`, falling back to a relative path when no home
/// directory can be determined.
fn default_checkout_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CHECKOUT_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_verbosity(v: &str) -> Args {
        Args {
            force: false,
            dir: None,
            upstream: None,
            no_strip: false,
            verbosity: v.to_string(),
        }
    }

    #[test]
    fn single_digit_verbosity_accepted() {
        for v in ["0", "1", "9"] {
            assert!(args_with_verbosity(v).validate().is_ok(), "{v}");
        }
    }

    #[test]
    fn bad_verbosity_rejected() {
        for v in ["", "10", "x", "-1", "2x"] {
            assert!(args_with_verbosity(v).validate().is_err(), "{v}");
        }
    }

    #[test]
    fn malformed_upstream_rejected() {
        let mut args = args_with_verbosity("1");
        for spec in ["/master", "origin/", "master", ""] {
            args.upstream = Some(spec.to_string());
            assert!(args.validate().is_err(), "{spec}");
        }

        args.upstream = Some("origin/master".to_string());
        assert!(args.validate().is_ok());
        args.upstream = Some("origin/feature/nested".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn no_strip_flag_maps_to_keep_policy() {
        let mut args = args_with_verbosity("1");
        args.no_strip = true;
        let config = RuntimeConfig::from_args(&args);
        assert_eq!(config.strip, StripPolicy::Keep);

        args.no_strip = false;
        let config = RuntimeConfig::from_args(&args);
        assert_eq!(config.strip, StripPolicy::Strip);
    }

    #[test]
    fn target_binary_lives_under_checkout() {
        let mut args = args_with_verbosity("1");
        args.dir = Some(PathBuf::from("/tmp/rgwork"));
        let config = RuntimeConfig::from_args(&args);
        assert_eq!(
            config.target_binary,
            PathBuf::from("/tmp/rgwork").join(RELEASE_BINARY_SUBPATH)
        );
    }
}
