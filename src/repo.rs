//! Repository state inspection and the pull-rebase action.
//!
//! All functions shell out to `git` inside the configured checkout. The
//! three commit ids gathered here (local HEAD, upstream head, merge base)
//! are the only repository facts the sync decision consumes.

use crate::error::{RepoError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// The three commit ids the relationship classification is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSnapshot {
    /// Upstream specifier the snapshot was taken against (remote/branch)
    pub upstream: String,
    /// Commit id of local HEAD
    pub local_head: String,
    /// Commit id of the resolved upstream head
    pub upstream_head: String,
    /// Most recent common ancestor of the two
    pub merge_base: String,
}

/// Handle to the git checkout under `dir`.
#[derive(Debug, Clone)]
pub struct Repo {
    dir: PathBuf,
}

impl Repo {
    /// Create a handle for the checkout at `dir`. The directory is assumed
    /// to have passed `preflight::check_checkout`.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Run a git subcommand and return its trimmed stdout.
    async fn git_output(&self, args: &[&str]) -> Result<String> {
        log::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RepoError::CommandFailed {
                command: args.join(" "),
                reason: format!("{}; {}", output.status, stderr.trim()),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Name of the currently checked-out branch (`symbolic-ref --short HEAD`).
    pub async fn current_branch(&self) -> Result<String> {
        self.git_output(&["symbolic-ref", "--short", "HEAD"]).await
    }

    /// Resolve the configured tracking branch of HEAD to a `remote/branch`
    /// spec via `for-each-ref`.
    pub async fn resolve_upstream(&self) -> Result<String> {
        let branch = self.current_branch().await?;
        let upstream = self
            .git_output(&[
                "for-each-ref",
                "--format=%(upstream:short)",
                &format!("refs/heads/{branch}"),
            ])
            .await?;
        if upstream.is_empty() {
            return Err(RepoError::UpstreamNotConfigured { branch }.into());
        }
        Ok(upstream)
    }

    /// Gather local HEAD, the upstream head, and their merge base.
    pub async fn snapshot(&self, upstream: &str) -> Result<RepoSnapshot> {
        let local_head = self.git_output(&["rev-parse", "HEAD"]).await?;
        let upstream_head = self.git_output(&["rev-parse", upstream]).await?;
        let merge_base = self
            .git_output(&["merge-base", "HEAD", upstream])
            .await?;
        Ok(RepoSnapshot {
            upstream: upstream.to_string(),
            local_head,
            upstream_head,
            merge_base,
        })
    }

    /// Pull with rebase against the given upstream spec, streaming git's own
    /// output to the terminal. Network, auth, and conflict failures all
    /// surface as `RepoError::PullFailed`.
    pub async fn pull_rebase(&self, upstream: &str) -> Result<()> {
        let (remote, branch) =
            split_upstream_spec(upstream).ok_or_else(|| RepoError::PullFailed {
                upstream: upstream.to_string(),
                reason: "upstream spec must be remote/branch".to_string(),
            })?;

        let status = Command::new("git")
            .args(["pull", "--rebase", remote, branch])
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(RepoError::PullFailed {
                upstream: upstream.to_string(),
                reason: status.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Split a `remote/branch` spec on the FIRST separator into the two
/// positional arguments `git pull` expects. Branch names may themselves
/// contain slashes, so only the first one delimits the remote.
pub fn split_upstream_spec(spec: &str) -> Option<(&str, &str)> {
    let (remote, branch) = spec.split_once('/')?;
    if remote.is_empty() || branch.is_empty() {
        return None;
    }
    Some((remote, branch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_splits_on_first_separator_only() {
        assert_eq!(
            split_upstream_spec("origin/master"),
            Some(("origin", "master"))
        );
        assert_eq!(
            split_upstream_spec("origin/feature/nested"),
            Some(("origin", "feature/nested"))
        );
    }

    #[test]
    fn degenerate_specs_rejected() {
        assert_eq!(split_upstream_spec("origin"), None);
        assert_eq!(split_upstream_spec("/master"), None);
        assert_eq!(split_upstream_spec("origin/"), None);
        assert_eq!(split_upstream_spec(""), None);
    }
}
