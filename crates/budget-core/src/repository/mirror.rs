//! Best-effort remote mirroring.
//!
//! Local writes finish before a mirror is started. A mirror runs on the
//! ambient tokio runtime; its failure is logged and never reaches the caller.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::remote::RemoteResult;

/// How a mirror attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// No mirror was attempted (no owner, no remote, or no runtime)
    Skipped,
    Mirrored,
    /// The remote write failed and was logged
    Failed,
}

/// Completion signal for a spawned mirror.
///
/// Dropping the handle detaches the mirror; it still runs to completion.
#[derive(Debug)]
pub struct MirrorHandle {
    task: Option<JoinHandle<MirrorOutcome>>,
}

impl MirrorHandle {
    pub fn skipped() -> Self {
        Self { task: None }
    }

    /// Spawn `op` on the current runtime.
    ///
    /// Without a runtime the mirror is skipped with a warning.
    pub(crate) fn spawn<F>(what: String, op: F) -> Self
    where
        F: Future<Output = RemoteResult<()>> + Send + 'static,
    {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No async runtime; skipping remote mirror of {}", what);
                return Self::skipped();
            }
        };

        let task = handle.spawn(async move {
            match op.await {
                Ok(()) => {
                    tracing::debug!("Mirrored {}", what);
                    MirrorOutcome::Mirrored
                }
                Err(err) => {
                    tracing::warn!("Remote mirror of {} failed: {}", what, err);
                    MirrorOutcome::Failed
                }
            }
        });
        Self { task: Some(task) }
    }

    /// Whether a mirror was started.
    pub fn is_spawned(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the mirror to finish.
    pub async fn wait(self) -> MirrorOutcome {
        match self.task {
            None => MirrorOutcome::Skipped,
            Some(task) => task.await.unwrap_or_else(|err| {
                tracing::warn!("Remote mirror task aborted: {}", err);
                MirrorOutcome::Failed
            }),
        }
    }
}

/// A locally-written record plus the handle of its remote mirror.
#[derive(Debug)]
pub struct Mirrored<E> {
    pub record: E,
    pub mirror: MirrorHandle,
}

impl<E> Mirrored<E> {
    /// Wait for the mirror and hand back the record.
    pub async fn settle(self) -> (E, MirrorOutcome) {
        let outcome = self.mirror.wait().await;
        (self.record, outcome)
    }

    pub fn into_record(self) -> E {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;

    #[test]
    fn test_spawn_without_runtime_is_skipped() {
        let handle = MirrorHandle::spawn("test".to_string(), async { Ok(()) });
        assert!(!handle.is_spawned());
    }

    #[tokio::test]
    async fn test_outcomes() {
        let ok = MirrorHandle::spawn("ok".to_string(), async { Ok(()) });
        assert_eq!(ok.wait().await, MirrorOutcome::Mirrored);

        let failed = MirrorHandle::spawn("failed".to_string(), async {
            Err(RemoteError::Unavailable("offline".to_string()))
        });
        assert_eq!(failed.wait().await, MirrorOutcome::Failed);

        assert_eq!(MirrorHandle::skipped().wait().await, MirrorOutcome::Skipped);
    }
}
