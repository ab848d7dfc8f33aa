//! Tests for configuration loading.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use claudebin::config::{ClaudebinConfig, DEFAULT_API_BASE_URL, MAX_PAYLOAD_BYTES};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 2] = ["CLAUDEBIN_API_URL", "CLAUDEBIN_HOME"];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn config_from_env_reads_api_url_and_home() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);

    std::env::set_var("CLAUDEBIN_API_URL", "https://claudebin.example");
    std::env::set_var("CLAUDEBIN_HOME", "/tmp/claudebin-home");

    let config = ClaudebinConfig::from_env();

    assert_eq!(config.api_base_url, "https://claudebin.example");
    assert_eq!(config.credentials_dir, PathBuf::from("/tmp/claudebin-home"));
}

#[test]
fn config_from_env_ignores_blank_values() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("CLAUDEBIN_API_URL", "   ");

    let config = ClaudebinConfig::from_env();

    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert!(config.credentials_dir.ends_with(".claudebin"));
}

#[test]
fn config_defaults_and_policies() {
    let config = ClaudebinConfig::new()
        .with_poll_interval(Duration::from_millis(500))
        .with_processing_timeout(Duration::from_secs(90));

    assert_eq!(config.max_payload_bytes, MAX_PAYLOAD_BYTES);
    assert!(config.open_browser);

    let auth = config.auth_poll_policy();
    assert_eq!(auth.interval, Duration::from_millis(500));
    assert_eq!(auth.timeout_message, "Authentication timed out after 5 minutes");

    let processing = config.processing_poll_policy();
    assert_eq!(processing.timeout, Duration::from_secs(90));
    assert_eq!(processing.timeout_message, "Processing timed out after 90 seconds");
}
