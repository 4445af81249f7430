//! Single writer thread. SQLite allows one writer at a time, so every mutation
//! is funneled through here in submission order.

use diesel::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use folio_core::errors::Result;

use super::DbPool;
use crate::errors::StorageError;

type Job = Box<dyn FnOnce(&mut SqliteConnection) + Send>;

#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteHandle {
    /// Runs `f` on the writer connection and returns its result.
    pub async fn exec<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |conn| {
            let _ = reply_tx.send(f(conn));
        });
        self.tx
            .send(job)
            .map_err(|_| StorageError::WriterUnavailable("writer thread has stopped".to_string()))?;
        reply_rx.await.map_err(|_| {
            StorageError::WriterUnavailable("writer dropped the request".to_string())
        })?
    }
}

/// Starts the writer thread. It holds one pooled connection for its lifetime
/// and exits once every handle is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    let spawned = std::thread::Builder::new()
        .name("folio-db-writer".to_string())
        .spawn(move || {
            let mut conn = match pool.get() {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Database writer could not acquire a connection: {}", e);
                    return;
                }
            };
            while let Some(job) = rx.blocking_recv() {
                job(&mut *conn);
            }
            debug!("Database writer stopped");
        });
    if let Err(e) = spawned {
        error!("Failed to start database writer thread: {}", e);
    }

    WriteHandle { tx }
}
