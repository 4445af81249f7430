//! Row model for the on-device key/value cache.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[diesel(primary_key(key))]
#[diesel(table_name = crate::schema::app_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AppDataDB {
    pub key: String,
    /// JSON text of the stored document.
    pub value: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}
