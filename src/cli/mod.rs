//! Command line interface for rgup.
//!
//! `run()` drives the whole once-per-invocation flow: preflight, toolchain
//! update, repository inspection, sync decision, and (when a reason fired)
//! the build/test/strip/report pipeline.

mod args;
mod output;

pub use args::{Args, RuntimeConfig, StripPolicy};
pub use output::OutputManager;

use crate::decision::{
    ConfirmRebuild, RebuildReasons, Relation, SyncAction, TerminalConfirm, classify, plan_sync,
};
use crate::error::{CliError, RepoError, Result};
use crate::repo::Repo;
use crate::{pipeline, preflight, toolchain};
use clap::CommandFactory;
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    if let Err(reason) = args.validate() {
        let usage = Args::command().render_usage();
        eprintln!("{usage}");
        return Err(CliError::InvalidArguments { reason }.into());
    }

    let config = RuntimeConfig::from_args(&args);
    execute(&config, &TerminalConfirm).await
}

/// Run the sync/rebuild flow against a prepared configuration.
///
/// The confirmation callback is injected so the ahead-of-upstream branch is
/// exercisable without a terminal.
pub async fn execute(config: &RuntimeConfig, confirm: &dyn ConfirmRebuild) -> Result<i32> {
    let output = config.output();

    preflight::check_environment().await?;
    preflight::check_checkout(&config.checkout_dir)?;
    output.detail(&format!("checkout: {}", config.checkout_dir.display()))?;

    let mut reasons = RebuildReasons::default();
    if config.force {
        reasons.note("forced by flag");
    }
    if !target_is_usable(&config.target_binary) {
        output.info(&format!(
            "Executable {} missing or not executable; rebuild is mandatory",
            config.target_binary.display()
        ))?;
        reasons.note("target executable absent");
    }

    let outcome = toolchain::update_toolchain(output).await?;
    if let Some(failure) = outcome.stage_failure {
        // Treated as "no update happened", not a hard stop.
        output.warn(&failure.to_string())?;
    }
    if outcome.updated {
        reasons.note("toolchain updated");
    }

    let repo = Repo::new(&config.checkout_dir);
    let upstream = match &config.upstream {
        Some(spec) => spec.clone(),
        None => repo.resolve_upstream().await?,
    };
    let snapshot = repo.snapshot(&upstream).await?;
    let relation = classify(&snapshot);
    output.detail(&format!(
        "local {} / upstream {} ({upstream})",
        &snapshot.local_head[..snapshot.local_head.len().min(12)],
        &snapshot.upstream_head[..snapshot.upstream_head.len().min(12)]
    ))?;

    if relation == Relation::Ahead {
        output.warn(&format!(
            "Local branch has commits that '{upstream}' lacks"
        ))?;
    }

    match plan_sync(relation, confirm)? {
        SyncAction::UpToDate => {
            output.info("Checkout requires no pull")?;
        }
        SyncAction::PullRebase => {
            output.info(&format!("Pulling with rebase from {upstream}"))?;
            repo.pull_rebase(&upstream).await?;
            reasons.note("repository pulled");
        }
        SyncAction::Refuse => {
            return Err(RepoError::Diverged { upstream }.into());
        }
    }

    if reasons.rebuild_required() {
        output.info(&format!(
            "Rebuild required ({} reason{}: {})",
            reasons.count(),
            if reasons.count() == 1 { "" } else { "s" },
            reasons.labels().join(", ")
        ))?;
        pipeline::run(config).await?;
        output.success("Sync and rebuild complete")?;
    } else {
        output.success("Rebuild not required; everything is current")?;
    }

    Ok(0)
}

/// Whether the expected executable exists and carries an executable bit.
fn target_is_usable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn absent_target_is_not_usable() {
        assert!(!target_is_usable(Path::new("/nonexistent/rgup/rg")));
    }

    #[cfg(unix)]
    #[test]
    fn exec_bit_decides_usability() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"#!/bin/sh\n").unwrap();

        let mut perms = std::fs::metadata(file.path()).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();
        assert!(!target_is_usable(file.path()));

        let mut perms = std::fs::metadata(file.path()).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(file.path(), perms).unwrap();
        assert!(target_is_usable(file.path()));
    }
}
