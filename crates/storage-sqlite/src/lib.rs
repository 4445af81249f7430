//! Embedded SQLite adapters for the local cache and legacy portfolio tiers.

pub mod cache;
pub mod db;
pub mod errors;
pub mod legacy;
pub mod schema;

use std::sync::Arc;

use folio_core::errors::Result;

pub use cache::LocalCacheRepository;
pub use errors::StorageError;
pub use legacy::LegacyStorageRepository;

/// Both on-device tiers sharing one pool and one writer.
pub struct SqliteStores {
    pub local_cache: Arc<LocalCacheRepository>,
    pub legacy: Arc<LegacyStorageRepository>,
}

/// Creates (or opens) the database under `app_data_dir`, migrates it, and
/// wires up the repositories.
pub fn open(app_data_dir: &str) -> Result<SqliteStores> {
    let db_path = db::init(app_data_dir)?;
    db::run_migrations(&db_path)?;
    let pool = db::create_pool(&db_path)?;
    let writer = db::spawn_writer(pool.as_ref().clone());

    Ok(SqliteStores {
        local_cache: Arc::new(LocalCacheRepository::new(pool.clone(), writer.clone())),
        legacy: Arc::new(LegacyStorageRepository::new(pool, writer)),
    })
}
