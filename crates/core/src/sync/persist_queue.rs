//! FIFO persistence worker mirroring in-memory state into the storage tiers.

use log::{debug, error};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::stores::{LocalCacheTrait, RemoteStoreTrait};
use super::sync_model::DataKey;
use crate::errors::{Error, Result};

/// Which tiers a job writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets {
    pub local: bool,
    pub remote: bool,
}

impl Targets {
    pub const ALL: Self = Self {
        local: true,
        remote: true,
    };
    pub const LOCAL_ONLY: Self = Self {
        local: true,
        remote: false,
    };
    pub const REMOTE_ONLY: Self = Self {
        local: false,
        remote: true,
    };
}

enum PersistJob {
    Write {
        key: DataKey,
        value: Value,
        targets: Targets,
        reply: Option<oneshot::Sender<Result<()>>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the persistence worker.
///
/// Jobs run strictly in submission order, so a later mutation can never be
/// overwritten in a backend by an earlier one.
#[derive(Clone)]
pub struct PersistQueue {
    tx: mpsc::UnboundedSender<PersistJob>,
}

impl PersistQueue {
    /// Spawns the worker on the current Tokio runtime.
    pub fn spawn(
        local: Arc<dyn LocalCacheTrait>,
        remote: Option<Arc<dyn RemoteStoreTrait>>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    PersistJob::Write {
                        key,
                        value,
                        targets,
                        reply,
                    } => {
                        let result = persist(local.as_ref(), remote.as_deref(), key, value, targets)
                            .await;
                        match reply {
                            Some(reply) => {
                                let _ = reply.send(result);
                            }
                            None => {
                                if let Err(err) = result {
                                    error!("Failed to persist '{}' remotely: {}", key, err);
                                }
                            }
                        }
                    }
                    PersistJob::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("Persistence worker stopped");
        });

        Self { tx }
    }

    /// Queues a fire-and-forget write. Failures are only logged.
    pub fn enqueue(&self, key: DataKey, value: Value, targets: Targets) {
        let job = PersistJob::Write {
            key,
            value,
            targets,
            reply: None,
        };
        if self.tx.send(job).is_err() {
            error!("Persistence worker is gone; dropped write for '{}'", key);
        }
    }

    /// Queues a write whose remote outcome the caller will await.
    ///
    /// Submission happens immediately, so callers can enqueue while still
    /// holding the state lock and await the receiver afterwards.
    pub fn submit_strict(&self, key: DataKey, value: Value, targets: Targets) -> StrictWrite {
        let (reply, rx) = oneshot::channel();
        let job = PersistJob::Write {
            key,
            value,
            targets,
            reply: Some(reply),
        };
        if self.tx.send(job).is_err() {
            error!("Persistence worker is gone; rejected write for '{}'", key);
        }
        StrictWrite { key, rx }
    }

    /// Resolves once every job queued before this call has finished.
    pub async fn flush(&self) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(PersistJob::Flush(done)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Pending outcome of a strict write.
pub struct StrictWrite {
    key: DataKey,
    rx: oneshot::Receiver<Result<()>>,
}

impl StrictWrite {
    pub async fn wait(self) -> Result<()> {
        self.rx.await.map_err(|_| {
            Error::InvalidState(format!(
                "Persistence worker stopped before '{}' was written",
                self.key
            ))
        })?
    }
}

/// Local cache failures are logged and swallowed; the remote outcome is returned.
async fn persist(
    local: &dyn LocalCacheTrait,
    remote: Option<&dyn RemoteStoreTrait>,
    key: DataKey,
    value: Value,
    targets: Targets,
) -> Result<()> {
    if targets.local {
        match local.set(key.as_str(), value.clone()).await {
            Ok(()) => debug!("Cached '{}' locally", key),
            Err(err) => error!("Failed to cache '{}' locally: {}", key, err),
        }
    }

    if targets.remote {
        if let Some(remote) = remote {
            remote.set(key.as_str(), &value).await?;
            debug!("Saved '{}' remotely", key);
        }
    }

    Ok(())
}
