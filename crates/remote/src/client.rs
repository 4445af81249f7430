//! Key/value client for the hosted PostgREST table holding portfolio documents.
//!
//! Every document is one row `{key, value, updated_at}`. Each operation runs
//! under its own deadline so a slow backend cannot stall startup or editing.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;

use folio_core::config::{RemoteConfig, RemoteTimeouts};
use folio_core::sync::RemoteStoreTrait;

use crate::error::{RemoteStoreError, Result};

const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Deserialize)]
struct ValueRow {
    value: Value,
}

/// Remote tier backed by a Supabase `app_data`-style table.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    table_url: String,
    anon_key: String,
    timeouts: RemoteTimeouts,
}

impl SupabaseStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                urlencoding::encode(&config.table)
            ),
            anon_key: config.anon_key.clone(),
            timeouts: config.timeouts,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let key_value = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| RemoteStoreError::api(401, "Invalid anon key format"))?;
        headers.insert("apikey", key_value);

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|_| RemoteStoreError::api(401, "Invalid anon key format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn key_filter(key: &str) -> String {
        format!("eq.{}", key)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Remote response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Remote response error ({}): {}", status, preview);
    }

    /// Reads the body and turns non-success statuses into `Api` errors.
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(RemoteStoreError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }
        Ok(body)
    }

    async fn with_deadline<T, F>(
        operation: &'static str,
        key: &str,
        limit: Duration,
        fut: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(RemoteStoreError::Timeout {
                operation,
                key: key.to_string(),
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Fetches the stored value. A missing row or a JSON `null` is `None`.
    pub async fn fetch_value(&self, key: &str) -> Result<Option<Value>> {
        let filter = Self::key_filter(key);
        let response = self
            .client
            .get(&self.table_url)
            .headers(self.headers()?)
            .query(&[("select", "value"), ("key", filter.as_str())])
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        let rows: Vec<ValueRow> = serde_json::from_str(&body)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.value)
            .filter(|value| !value.is_null()))
    }

    async fn row_exists(&self, key: &str) -> Result<bool> {
        let filter = Self::key_filter(key);
        let response = self
            .client
            .get(&self.table_url)
            .headers(self.headers()?)
            .query(&[("select", "key"), ("key", filter.as_str())])
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        let rows: Vec<Value> = serde_json::from_str(&body)?;
        Ok(!rows.is_empty())
    }

    async fn upsert(&self, key: &str, value: &Value) -> Result<()> {
        let row = json!({
            "key": key,
            "value": value,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let response = self
            .client
            .post(&self.table_url)
            .headers(self.headers()?)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "key")])
            .json(&row)
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }

    /// Update-only write for setups where inserts are blocked by row policies.
    async fn update_existing(&self, key: &str, value: &Value) -> Result<()> {
        let patch = json!({
            "value": value,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let filter = Self::key_filter(key);
        let response = self
            .client
            .patch(&self.table_url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .query(&[("key", filter.as_str()), ("select", "key")])
            .json(&patch)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        let rows: Vec<Value> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(RemoteStoreError::verification(format!(
                "no existing row for '{}' to update",
                key
            )));
        }
        Ok(())
    }

    /// Upserts the value, falling back to an update of an existing row.
    pub async fn save_value(&self, key: &str, value: &Value) -> Result<()> {
        match self.upsert(key, value).await {
            Ok(()) => {
                if !self.row_exists(key).await? {
                    warn!("Remote row for '{}' missing after upsert", key);
                    return Err(RemoteStoreError::verification(format!(
                        "row for '{}' not found after upsert",
                        key
                    )));
                }
                Ok(())
            }
            Err(upsert_err) => {
                warn!("Remote upsert failed for '{}': {}", key, upsert_err);
                self.update_existing(key, value).await.map_err(|update_err| {
                    warn!("Remote update also failed for '{}': {}", key, update_err);
                    update_err
                })?;
                info!("Saved '{}' remotely via update fallback", key);
                Ok(())
            }
        }
    }

    pub async fn delete_value(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(&self.table_url)
            .headers(self.headers()?)
            .query(&[("key", Self::key_filter(key))])
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStoreTrait for SupabaseStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let result =
            Self::with_deadline("get", key, self.timeouts.read, self.fetch_value(key)).await;
        match result {
            Ok(value) => value,
            Err(err) if err.is_not_found() => {
                debug!("Remote has no table row for '{}'", key);
                None
            }
            Err(err) => {
                warn!("Remote read for '{}' failed: {}", key, err);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &Value) -> folio_core::Result<()> {
        Self::with_deadline("set", key, self.timeouts.write, self.save_value(key, value)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> folio_core::Result<()> {
        Self::with_deadline("delete", key, self.timeouts.write, self.delete_value(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Error;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TABLE_PATH: &str = "/rest/v1/app_data";

    fn store_for(server: &MockServer) -> SupabaseStore {
        SupabaseStore::new(&RemoteConfig::new(&server.uri(), "anon-key")).expect("client")
    }

    async fn mount_value_read(server: &MockServer, key: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("select", "value"))
            .and(query_param("key", format!("eq.{key}")))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn mount_upsert(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(query_param("on_conflict", "key"))
            .respond_with(template)
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_key_check(server: &MockServer, key: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("select", "key"))
            .and(query_param("key", format!("eq.{key}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_update(server: &MockServer, key: &str, template: ResponseTemplate) {
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .and(query_param("key", format!("eq.{key}")))
            .and(query_param("select", "key"))
            .respond_with(template)
            .expect(1)
            .mount(server)
            .await;
    }

    fn rejected() -> ResponseTemplate {
        ResponseTemplate::new(403)
            .set_body_string(r#"{"message": "new row violates row-level security policy"}"#)
    }

    #[tokio::test]
    async fn get_reads_the_value_column() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("select", "value"))
            .and(query_param("key", "eq.about_info"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"[{"value": {"name": "Lin"}}]"#),
            )
            .expect(1)
            .mount(&server)
            .await;
        let store = store_for(&server);

        assert_eq!(store.get("about_info").await, Some(json!({"name": "Lin"})));
    }

    #[tokio::test]
    async fn get_maps_missing_rows_and_errors_to_none() {
        let server = MockServer::start().await;
        mount_value_read(&server, "lit_cities", ResponseTemplate::new(200).set_body_string("[]"))
            .await;
        mount_value_read(
            &server,
            "hero_images",
            ResponseTemplate::new(200).set_body_string(r#"[{"value": null}]"#),
        )
        .await;
        mount_value_read(
            &server,
            "about_info",
            ResponseTemplate::new(401).set_body_string(r#"{"message": "Invalid API key"}"#),
        )
        .await;
        mount_value_read(
            &server,
            "animation_config",
            ResponseTemplate::new(200).set_body_string("not json"),
        )
        .await;
        let store = store_for(&server);

        for key in ["lit_cities", "hero_images", "about_info", "animation_config"] {
            assert_eq!(store.get(key).await, None, "{key}");
        }
    }

    #[tokio::test]
    async fn set_upserts_then_verifies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(query_param("on_conflict", "key"))
            .and(body_partial_json(json!({"key": "hero_images", "value": [{"id": "h1"}]})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        mount_key_check(&server, "hero_images", r#"[{"key": "hero_images"}]"#).await;
        let store = store_for(&server);

        store
            .set("hero_images", &json!([{"id": "h1"}]))
            .await
            .expect("set");

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 2);
        let prefer = requests[0]
            .headers
            .get("prefer")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(prefer.contains("resolution=merge-duplicates"));
    }

    #[tokio::test]
    async fn set_fails_when_row_is_missing_after_upsert() {
        let server = MockServer::start().await;
        mount_upsert(&server, ResponseTemplate::new(201)).await;
        mount_key_check(&server, "about_info", "[]").await;
        let store = store_for(&server);

        let err = store
            .set("about_info", &json!({}))
            .await
            .expect_err("verification");
        assert!(matches!(err, Error::Remote(ref m) if m.contains("verification")));
    }

    #[tokio::test]
    async fn rejected_upsert_falls_back_to_update() {
        let server = MockServer::start().await;
        mount_upsert(&server, rejected()).await;
        mount_update(
            &server,
            "lit_cities",
            ResponseTemplate::new(200).set_body_string(r#"[{"key": "lit_cities"}]"#),
        )
        .await;
        let store = store_for(&server);

        store.set("lit_cities", &json!([])).await.expect("fallback");

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn update_matching_no_rows_is_a_failure() {
        let server = MockServer::start().await;
        mount_upsert(&server, rejected()).await;
        mount_update(
            &server,
            "animation_config",
            ResponseTemplate::new(200).set_body_string("[]"),
        )
        .await;
        let store = store_for(&server);

        let err = store
            .set("animation_config", &json!({}))
            .await
            .expect_err("no row");
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn update_failure_is_surfaced() {
        let server = MockServer::start().await;
        mount_upsert(&server, rejected()).await;
        mount_update(&server, "photo_collections", rejected()).await;
        let store = store_for(&server);

        let err = store
            .set("photo_collections", &json!([]))
            .await
            .expect_err("both rejected");
        assert!(matches!(err, Error::Remote(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn delete_targets_the_key() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(TABLE_PATH))
            .and(query_param("key", "eq.hero_images"))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        let store = store_for(&server);

        store.delete("hero_images").await.expect("delete");
        assert!(store.delete("hero_images").await.is_err());
    }

    #[tokio::test]
    async fn stalled_backend_is_bounded() {
        let server = MockServer::start().await;
        let stall = Duration::from_millis(1_000);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]").set_delay(stall))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(stall))
            .mount(&server)
            .await;
        let mut config = RemoteConfig::new(&server.uri(), "anon-key");
        config.timeouts = RemoteTimeouts {
            read: Duration::from_millis(100),
            write: Duration::from_millis(200),
        };
        let store = SupabaseStore::new(&config).expect("client");

        assert_eq!(store.get("about_info").await, None);

        let err = store
            .set("about_info", &json!({}))
            .await
            .expect_err("timeout");
        assert!(matches!(
            err,
            Error::RemoteTimeout { operation: "set", timeout_ms: 200, .. }
        ));
    }

    #[tokio::test]
    async fn deadline_reports_configured_millis() {
        let err = SupabaseStore::with_deadline(
            "delete",
            "hero_images",
            Duration::from_millis(25),
            std::future::pending::<Result<()>>(),
        )
        .await
        .expect_err("pending never finishes");
        assert!(matches!(
            err,
            RemoteStoreError::Timeout { operation: "delete", timeout_ms: 25, ref key } if key == "hero_images"
        ));
    }

    #[test]
    fn custom_table_is_part_of_the_url() {
        let mut config = RemoteConfig::new("https://x.supabase.co/", "anon");
        config.table = "portfolio data".to_string();
        let store = SupabaseStore::new(&config).expect("client");
        assert_eq!(store.table_url, "https://x.supabase.co/rest/v1/portfolio%20data");
    }
}
