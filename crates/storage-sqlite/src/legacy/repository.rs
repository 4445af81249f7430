use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use folio_core::errors::Result;
use folio_core::sync::LegacyStoreTrait;

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::legacy_storage;

/// Read-and-erase access to the flat store left by earlier releases.
pub struct LegacyStorageRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl LegacyStorageRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        LegacyStorageRepository { pool, writer }
    }

    pub fn get_raw_impl(&self, entry_key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let raw = legacy_storage::table
            .find(entry_key)
            .select(legacy_storage::value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(raw)
    }

    pub fn remaining_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = legacy_storage::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }
}

#[async_trait]
impl LegacyStoreTrait for LegacyStorageRepository {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.get_raw_impl(key)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let entry_key = key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(legacy_storage::table.find(&entry_key))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Removed {} legacy row(s) for '{}'", affected, entry_key);
                Ok(())
            })
            .await
    }
}
