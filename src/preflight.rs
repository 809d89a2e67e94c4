//! Environment and checkout preconditions.
//!
//! Everything here runs before any filesystem or network mutation so that an
//! unusable environment fails fast with a single diagnostic.

use crate::error::{PreflightError, Result};
use std::path::Path;
use tokio::process::Command;

/// External executables the sync/rebuild flow shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["git", "rustup", "cargo", "strip"];

/// Minimum git major version; older clients lack the plumbing this tool uses.
const MIN_GIT_MAJOR: u32 = 2;

/// Verify every required external executable is on PATH and the git client
/// is recent enough for `rev-parse`, `merge-base`, `for-each-ref`,
/// `symbolic-ref`, and `pull --rebase`.
pub async fn check_environment() -> Result<()> {
    for tool in REQUIRED_TOOLS {
        if which::which(tool).is_err() {
            return Err(PreflightError::MissingExecutable {
                name: tool.to_string(),
            }
            .into());
        }
        log::debug!("found required executable: {tool}");
    }

    let output = Command::new("git").arg("--version").output().await?;
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let major = parse_git_major(&text).ok_or_else(|| PreflightError::UnparseableGitVersion {
        output: text.clone(),
    })?;
    if major < MIN_GIT_MAJOR {
        return Err(PreflightError::GitTooOld {
            found: text,
            required: MIN_GIT_MAJOR,
        }
        .into());
    }

    Ok(())
}

/// Verify the checkout directory exists and looks like the expected project
/// root: a git work tree with a `Cargo.toml` at its top level.
pub fn check_checkout(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(PreflightError::BadCheckout {
            path: dir.to_path_buf(),
            reason: "directory does not exist".to_string(),
        }
        .into());
    }
    if !dir.join(".git").exists() {
        return Err(PreflightError::BadCheckout {
            path: dir.to_path_buf(),
            reason: "no .git directory (not a git checkout)".to_string(),
        }
        .into());
    }
    if !dir.join("Cargo.toml").is_file() {
        return Err(PreflightError::BadCheckout {
            path: dir.to_path_buf(),
            reason: "no Cargo.toml (not a Rust project root)".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Extract the major version from `git --version` output, e.g.
/// "git version 2.43.0" -> 2. Tolerates vendor suffixes like
/// "2.39.3 (Apple Git-146)".
fn parse_git_major(output: &str) -> Option<u32> {
    output
        .split_whitespace()
        .find(|token| token.chars().next().is_some_and(|c| c.is_ascii_digit()))?
        .split('.')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn git_major_parsed_from_typical_output() {
        assert_eq!(parse_git_major("git version 2.43.0"), Some(2));
        assert_eq!(parse_git_major("git version 2.39.3 (Apple Git-146)"), Some(2));
        assert_eq!(parse_git_major("git version 1.8.3.1"), Some(1));
    }

    #[test]
    fn git_major_rejects_garbage() {
        assert_eq!(parse_git_major(""), None);
        assert_eq!(parse_git_major("not a version"), None);
    }

    #[test]
    fn missing_directory_is_a_bad_checkout() {
        let err = check_checkout(Path::new("/nonexistent/rgup-test")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn directory_without_git_metadata_rejected() {
        let dir = TempDir::new().unwrap();
        let err = check_checkout(dir.path()).unwrap_err();
        assert!(err.to_string().contains(".git"));
    }

    #[test]
    fn directory_without_manifest_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let err = check_checkout(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Cargo.toml"));
    }

    #[test]
    fn complete_checkout_accepted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();
        assert!(check_checkout(dir.path()).is_ok());
    }
}
