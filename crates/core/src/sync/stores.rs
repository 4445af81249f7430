//! Storage tier contracts consumed by the reconciliation engine.

use async_trait::async_trait;
use serde_json::Value;

use super::sync_model::SeedDocument;
use crate::errors::Result;

/// Remote key/value persistence.
///
/// `get` never fails: any transport, authorization or lookup error is reported
/// as "not found" so startup can fall through to the local cache. `set` and
/// `delete` surface failures, including timeouts.
#[async_trait]
pub trait RemoteStoreTrait: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;

    async fn set(&self, key: &str, value: &Value) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// On-device key/value cache.
#[async_trait]
pub trait LocalCacheTrait: Send + Sync {
    /// Returns `Ok(None)` for a key that was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Flat storage from earlier releases holding JSON-encoded strings. Read and erased, never written.
#[async_trait]
pub trait LegacyStoreTrait: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Bundled first-run data.
#[async_trait]
pub trait SeedSourceTrait: Send + Sync {
    async fn fetch(&self) -> Result<SeedDocument>;
}
