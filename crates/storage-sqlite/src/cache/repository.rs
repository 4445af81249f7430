use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

use folio_core::errors::{Error, Result};
use folio_core::sync::LocalCacheTrait;

use super::model::AppDataDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_data;

/// Local cache tier backed by the `app_data` table.
pub struct LocalCacheRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl LocalCacheRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        LocalCacheRepository { pool, writer }
    }

    pub fn get_entry_impl(&self, entry_key: &str) -> Result<Option<AppDataDB>> {
        let mut conn = get_connection(&self.pool)?;
        let row = app_data::table
            .find(entry_key)
            .select(AppDataDB::as_select())
            .first::<AppDataDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row)
    }

    pub fn list_keys(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let keys = app_data::table
            .select(app_data::key)
            .order(app_data::key.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(keys)
    }
}

#[async_trait]
impl LocalCacheTrait for LocalCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(row) = self.get_entry_impl(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&row.value).map_err(|e| Error::corrupt(key, e.to_string()))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let row = AppDataDB {
            key: key.to_string(),
            value: serde_json::to_string(&value)?,
            updated_at: Utc::now().to_rfc3339(),
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(app_data::table)
                    .values(&row)
                    .on_conflict(app_data::key)
                    .do_update()
                    .set((
                        app_data::value.eq(&row.value),
                        app_data::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Stored '{}' in local cache", row.key);
                Ok(())
            })
            .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let entry_key = key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(app_data::table.find(entry_key))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
