//! The sync/rebuild decision procedure.
//!
//! Inspection, decision, and action are kept separate: `classify` turns
//! three commit ids into a closed relation type, `plan_sync` turns that
//! relation into the single action to take, and the CLI flow performs the
//! action. The interactive prompt is behind a trait so the decision logic
//! is testable without a terminal.

use crate::error::Result;
use crate::repo::RepoSnapshot;
use std::io::{BufRead, Write};

/// Relationship between local HEAD and the resolved upstream head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Local and upstream point at the same commit
    Identical,
    /// Local is a strict ancestor of upstream (fast-forwardable)
    Behind,
    /// Local has commits upstream lacks; upstream has nothing new
    Ahead,
    /// Both sides have unique commits; requires manual resolution
    Diverged,
}

/// The one action the sync step takes for a given relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Nothing to pull; no rebuild reason from the repository
    UpToDate,
    /// Pull with rebase, then count the pull as a rebuild reason
    PullRebase,
    /// True divergence: abort, never attempt automatic resolution
    Refuse,
}

/// Classify the three-way relationship between local HEAD, the upstream
/// head, and their merge base.
pub fn classify(snapshot: &RepoSnapshot) -> Relation {
    if snapshot.local_head == snapshot.upstream_head {
        Relation::Identical
    } else if snapshot.local_head == snapshot.merge_base {
        Relation::Behind
    } else if snapshot.upstream_head == snapshot.merge_base {
        Relation::Ahead
    } else {
        Relation::Diverged
    }
}

/// Injected confirmation callback for the ahead-of-upstream case.
pub trait ConfirmRebuild {
    /// Ask the user a yes/no question; `Ok(true)` means rebuild now.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Terminal implementation: prints the prompt and reads one line from stdin.
/// Anything other than an explicit yes counts as "skip".
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl ConfirmRebuild for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt} [y/N] ")?;
        stdout.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
    }
}

/// Decide the sync action for a classified relation.
///
/// The confirmation callback is consulted only for `Ahead`; every other
/// relation has exactly one unconditional action.
pub fn plan_sync(relation: Relation, confirm: &dyn ConfirmRebuild) -> Result<SyncAction> {
    match relation {
        Relation::Identical => Ok(SyncAction::UpToDate),
        Relation::Behind => Ok(SyncAction::PullRebase),
        Relation::Ahead => {
            if confirm.confirm("Local branch is ahead of upstream. Rebuild anyway?")? {
                // Pull is a no-op here but keeps the behavior symmetric with
                // the behind case.
                Ok(SyncAction::PullRebase)
            } else {
                Ok(SyncAction::UpToDate)
            }
        }
        Relation::Diverged => Ok(SyncAction::Refuse),
    }
}

/// Accumulator of distinct justifications for rebuilding. The counter only
/// ever grows; the build pipeline runs iff it is nonzero.
#[derive(Debug, Default)]
pub struct RebuildReasons {
    labels: Vec<&'static str>,
}

impl RebuildReasons {
    /// Record one justification for rebuilding.
    pub fn note(&mut self, label: &'static str) {
        log::debug!("rebuild reason: {label}");
        self.labels.push(label);
    }

    /// Number of justifications recorded so far.
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    /// Whether the build pipeline should run.
    pub fn rebuild_required(&self) -> bool {
        !self.labels.is_empty()
    }

    /// The recorded justifications, in the order they fired.
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }
}
