//! Environment-derived configuration for the remote tier.

use std::sync::OnceLock;
use std::time::Duration;

pub const REMOTE_URL_ENV: &str = "SUPABASE_URL";
pub const REMOTE_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const REMOTE_TABLE_ENV: &str = "FOLIO_REMOTE_TABLE";
pub const REMOTE_READ_TIMEOUT_ENV: &str = "FOLIO_REMOTE_READ_TIMEOUT_MS";
pub const REMOTE_WRITE_TIMEOUT_ENV: &str = "FOLIO_REMOTE_WRITE_TIMEOUT_MS";

/// Generic key/value table every document lives in.
pub const DEFAULT_REMOTE_TABLE: &str = "app_data";

/// Reads gate startup, so they get the shorter window.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 15_000;

/// Bounded waits applied to every remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTimeouts {
    pub read: Duration,
    pub write: Duration,
}

impl Default for RemoteTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            write: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

/// Connection parameters for the remote store.
///
/// Only exists when both the endpoint and the access key are set, so holding a
/// `RemoteConfig` is the same as "remote is configured".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
    pub table: String,
    pub timeouts: RemoteTimeouts,
}

impl RemoteConfig {
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
            table: DEFAULT_REMOTE_TABLE.to_string(),
            timeouts: RemoteTimeouts::default(),
        }
    }

    /// Reads the remote configuration from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = non_empty(REMOTE_URL_ENV)?;
        let anon_key = non_empty(REMOTE_KEY_ENV)?;
        let mut config = Self::new(&url, &anon_key);

        if let Some(table) = non_empty(REMOTE_TABLE_ENV) {
            config.table = table;
        }

        let millis = |name: &str, default: u64| {
            non_empty(name)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        let write = millis(REMOTE_WRITE_TIMEOUT_ENV, DEFAULT_WRITE_TIMEOUT_MS);
        let read = millis(REMOTE_READ_TIMEOUT_ENV, DEFAULT_READ_TIMEOUT_MS).min(write);
        config.timeouts = RemoteTimeouts {
            read: Duration::from_millis(read),
            write: Duration::from_millis(write),
        };

        Some(config)
    }
}

static REMOTE_CONFIGURED: OnceLock<bool> = OnceLock::new();

/// True when both remote connection parameters are present in the environment.
///
/// Evaluated on first call; later environment changes are not observed.
pub fn is_remote_configured() -> bool {
    *REMOTE_CONFIGURED.get_or_init(|| RemoteConfig::from_env().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn requires_both_url_and_key() {
        assert!(RemoteConfig::from_lookup(lookup(&[(REMOTE_URL_ENV, "https://x.supabase.co")]))
            .is_none());
        assert!(RemoteConfig::from_lookup(lookup(&[(REMOTE_KEY_ENV, "anon")])).is_none());
        assert!(RemoteConfig::from_lookup(lookup(&[
            (REMOTE_URL_ENV, "   "),
            (REMOTE_KEY_ENV, "anon"),
        ]))
        .is_none());
    }

    #[test]
    fn trims_url_and_applies_defaults() {
        let config = RemoteConfig::from_lookup(lookup(&[
            (REMOTE_URL_ENV, " https://x.supabase.co/ "),
            (REMOTE_KEY_ENV, "anon"),
        ]))
        .expect("configured");
        assert_eq!(config.url, "https://x.supabase.co");
        assert_eq!(config.table, DEFAULT_REMOTE_TABLE);
        assert_eq!(config.timeouts, RemoteTimeouts::default());
        assert!(config.timeouts.read < config.timeouts.write);
    }

    #[test]
    fn read_timeout_never_exceeds_write_timeout() {
        let config = RemoteConfig::from_lookup(lookup(&[
            (REMOTE_URL_ENV, "https://x.supabase.co"),
            (REMOTE_KEY_ENV, "anon"),
            (REMOTE_READ_TIMEOUT_ENV, "30000"),
            (REMOTE_WRITE_TIMEOUT_ENV, "2000"),
        ]))
        .expect("configured");
        assert_eq!(config.timeouts.read, Duration::from_millis(2000));
        assert_eq!(config.timeouts.write, Duration::from_millis(2000));
    }

    #[test]
    fn invalid_timeouts_fall_back_to_defaults() {
        let config = RemoteConfig::from_lookup(lookup(&[
            (REMOTE_URL_ENV, "https://x.supabase.co"),
            (REMOTE_KEY_ENV, "anon"),
            (REMOTE_READ_TIMEOUT_ENV, "soon"),
            (REMOTE_WRITE_TIMEOUT_ENV, "0"),
            (REMOTE_TABLE_ENV, "portfolio_kv"),
        ]))
        .expect("configured");
        assert_eq!(config.timeouts, RemoteTimeouts::default());
        assert_eq!(config.table, "portfolio_kv");
    }

    #[test]
    fn configured_flag_is_read_once() {
        let first = is_remote_configured();
        if first {
            std::env::remove_var(REMOTE_URL_ENV);
        } else {
            std::env::set_var(REMOTE_URL_ENV, "https://x.supabase.co");
            std::env::set_var(REMOTE_KEY_ENV, "anon");
        }
        assert_eq!(is_remote_configured(), first);
    }
}
