//! Destructive and administrative actions that round-trip through the backend.

use std::sync::Arc;

use shared::domain::{Location, SystemStats};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{error::MutationError, RemoteService};

/// File-system changes. Their results are picked up by re-listing the directory,
/// since the affected identifiers may change (a renamed path, a new copy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMutation {
    Rename { from: Location, to: Location },
    Duplicate { path: Location },
    Delete { path: Location },
}

impl FileMutation {
    pub fn action(&self) -> &'static str {
        match self {
            FileMutation::Rename { .. } => "rename",
            FileMutation::Duplicate { .. } => "duplicate",
            FileMutation::Delete { .. } => "delete",
        }
    }

    pub fn target(&self) -> &Location {
        match self {
            FileMutation::Rename { from, .. } => from,
            FileMutation::Duplicate { path } | FileMutation::Delete { path } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the change; local state already reflects it.
    Confirmed,
    /// The backend refused; local state was replaced by a fresh backend snapshot.
    Reconciled { reason: String },
    /// The backend refused and the snapshot reload failed too; the optimistic
    /// state stays until the next refresh replaces it.
    Unreconciled { reason: String },
}

pub struct OptimisticMutationCoordinator {
    remote: Arc<dyn RemoteService>,
}

impl OptimisticMutationCoordinator {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    /// Drops `pid` from the displayed activity before asking the backend to
    /// terminate it. A refusal discards the local edit wholesale by reloading
    /// the authoritative process list.
    pub async fn kill_process(
        &self,
        pid: u32,
        activity: &Mutex<Option<SystemStats>>,
    ) -> MutationOutcome {
        self.remove_process(pid, activity).await;
        self.terminate_process(pid, activity).await
    }

    /// Local half of a kill. Returns true when a displayed entry was dropped.
    pub async fn remove_process(&self, pid: u32, activity: &Mutex<Option<SystemStats>>) -> bool {
        let mut activity = activity.lock().await;
        let Some(stats) = activity.as_mut() else {
            return false;
        };
        let before = stats.top_processes.len();
        stats.top_processes.retain(|process| process.pid != pid);
        stats.top_processes.len() != before
    }

    /// Backend half of a kill, reconciling `activity` when the backend refuses.
    pub async fn terminate_process(
        &self,
        pid: u32,
        activity: &Mutex<Option<SystemStats>>,
    ) -> MutationOutcome {
        let reason = match self.remote.kill_process(pid).await {
            Ok(()) => {
                info!(pid, "mutation: process terminated");
                return MutationOutcome::Confirmed;
            }
            Err(err) => err.to_string(),
        };
        warn!(pid, reason = %reason, "mutation: kill refused; reloading activity");

        match self.remote.get_system_stats().await {
            Ok(fresh) => {
                *activity.lock().await = Some(fresh);
                MutationOutcome::Reconciled { reason }
            }
            Err(err) => {
                warn!(pid, error = %err, "mutation: activity reload failed after refused kill");
                MutationOutcome::Unreconciled { reason }
            }
        }
    }

    pub async fn apply_file_mutation(&self, mutation: &FileMutation) -> Result<(), MutationError> {
        let result = match mutation {
            FileMutation::Rename { from, to } => self.remote.rename_path(from, to).await,
            FileMutation::Duplicate { path } => self.remote.duplicate_path(path).await,
            FileMutation::Delete { path } => self.remote.delete_path(path).await,
        };

        match result {
            Ok(()) => {
                info!(
                    action = mutation.action(),
                    path = %mutation.target(),
                    "mutation: applied"
                );
                Ok(())
            }
            Err(err) => {
                let err = MutationError::new(mutation.action(), mutation.target().as_str(), &err);
                warn!(error = %err, "mutation: failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
