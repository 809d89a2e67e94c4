//! Toolchain updating via `rustup update`.
//!
//! `rustup update` exits zero whether or not anything was installed, so the
//! "did an update happen" signal comes from scanning its output for a known
//! marker while the same stream is echoed live to the user. The run is
//! modeled as explicit stages whose results are checked independently, so a
//! failure in the update command itself is never masked by a later stage
//! that happened to succeed.

use crate::cli::OutputManager;
use crate::error::{Result, ToolchainError};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Literal substring rustup prints for each toolchain it actually updated,
/// e.g. `stable-x86_64-unknown-linux-gnu updated - rustc 1.80.0`.
pub const UPDATE_MARKER: &str = "updated - rustc";

/// Result of one stage of the update-and-scan pipeline.
#[derive(Debug)]
pub struct StageReport {
    /// Human-readable stage name for diagnostics
    pub name: &'static str,
    /// Ok, or a description of how the stage failed
    pub outcome: std::result::Result<(), String>,
}

/// Outcome of a toolchain update attempt.
#[derive(Debug)]
pub struct ToolchainOutcome {
    /// True iff the update marker appeared in the combined output
    pub updated: bool,
    /// First failing pipeline stage, if any. The caller decides whether to
    /// treat this as "no update happened" or to propagate it.
    pub stage_failure: Option<ToolchainError>,
}

/// Run `rustup update`, echoing its combined output live while accumulating
/// it for marker scanning.
///
/// Failure to launch the process at all is an error; failures of individual
/// pipeline stages are reported in the returned outcome with the index of
/// the FIRST failing stage.
pub async fn update_toolchain(output: &OutputManager) -> Result<ToolchainOutcome> {
    output.info("Updating Rust toolchain (rustup update)")?;

    let mut child = Command::new("rustup")
        .arg("update")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ToolchainError::LaunchFailed {
            reason: e.to_string(),
        })?;

    let stdout = child.stdout.take().ok_or_else(|| ToolchainError::LaunchFailed {
        reason: "child stdout not captured".to_string(),
    })?;
    let stderr = child.stderr.take().ok_or_else(|| ToolchainError::LaunchFailed {
        reason: "child stderr not captured".to_string(),
    })?;

    // Stream fan-out: each line is printed as it arrives and kept in memory.
    let stdout_task = tokio::spawn(tee_lines(stdout, output.clone()));
    let stderr_task = tokio::spawn(tee_lines(stderr, output.clone()));

    let status = child.wait().await;
    let stdout_result = stdout_task.await;
    let stderr_result = stderr_task.await;

    let mut combined = String::new();
    let mut stages = Vec::with_capacity(3);

    stages.push(StageReport {
        name: "rustup update",
        outcome: match &status {
            Ok(s) if s.success() => Ok(()),
            Ok(s) => Err(s.to_string()),
            Err(e) => Err(e.to_string()),
        },
    });
    for (name, result) in [("stdout capture", stdout_result), ("stderr capture", stderr_result)] {
        stages.push(StageReport {
            name,
            outcome: match result {
                Ok(Ok(text)) => {
                    combined.push_str(&text);
                    Ok(())
                }
                Ok(Err(e)) => Err(e.to_string()),
                Err(join_err) => Err(join_err.to_string()),
            },
        });
    }

    let stage_failure = first_failure(&stages).map(|(index, stage)| {
        let reason = stage
            .outcome
            .as_ref()
            .err()
            .cloned()
            .unwrap_or_default();
        ToolchainError::StageFailed {
            index,
            stage: stage.name.to_string(),
            reason,
        }
    });

    let updated = stage_failure.is_none() && update_occurred(&combined);
    if updated {
        output.success("Toolchain updated")?;
    } else if stage_failure.is_none() {
        output.info("Toolchain already up to date")?;
    }

    Ok(ToolchainOutcome {
        updated,
        stage_failure,
    })
}

/// Read lines from a child stream, echoing each one and returning the
/// accumulated text.
async fn tee_lines<R>(stream: R, output: OutputManager) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    let mut accumulated = String::new();
    while let Some(line) = lines.next_line().await? {
        let _ = output.passthrough(&line);
        accumulated.push_str(&line);
        accumulated.push('\n');
    }
    Ok(accumulated)
}

/// Whether the combined output indicates an update was actually applied.
pub fn update_occurred(combined_output: &str) -> bool {
    combined_output.contains(UPDATE_MARKER)
}

/// First failing stage by index. Every stage is inspected, so an early
/// failure is reported even when every later stage succeeded.
pub fn first_failure(stages: &[StageReport]) -> Option<(usize, &StageReport)> {
    stages
        .iter()
        .enumerate()
        .find(|(_, stage)| stage.outcome.is_err())
}
