//! Network-facing tiers: the hosted key/value store and the seed document.

mod client;
mod error;
mod seed;

use log::{info, warn};
use std::sync::Arc;

use folio_core::config::RemoteConfig;
use folio_core::sync::RemoteStoreTrait;

pub use client::SupabaseStore;
pub use error::{RemoteStoreError, Result};
pub use seed::{FileSeedSource, HttpSeedSource};

/// Builds the remote tier when it is configured.
///
/// `None` means the engine runs with local tiers only. A client that cannot be
/// constructed is treated the same way.
pub fn connect_remote_store(config: Option<RemoteConfig>) -> Option<Arc<dyn RemoteStoreTrait>> {
    let config = config?;
    match SupabaseStore::new(&config) {
        Ok(store) => {
            info!("Remote store configured at {} (table '{}')", config.url, config.table);
            Some(Arc::new(store))
        }
        Err(err) => {
            warn!("Remote store disabled, client setup failed: {}", err);
            None
        }
    }
}
