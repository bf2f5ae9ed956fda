//! Shared test utilities for mbgate crates.
//!
//! Environment-driven configuration is process-global, so tests that touch
//! `METABASE_*` variables serialize on [`env_guard`] and restore values
//! through [`EnvVarGuard`].

use std::sync::{LazyLock, Mutex, MutexGuard};

/// Every variable the gateway configuration reads.
pub const METABASE_ENV_VARS: &[&str] = &[
    "METABASE_URL",
    "METABASE_API_KEY",
    "METABASE_SESSION_TOKEN",
    "METABASE_USERNAME",
    "METABASE_PASSWORD",
    "METABASE_TIMEOUT_MS",
];

/// Serialize tests that mutate process-global state (env vars).
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = mbgate_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value" until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Unset every `METABASE_*` variable until the returned guards drop.
///
/// Hold [`env_guard`] first; this only isolates, it does not serialize.
pub fn clear_metabase_env() -> Vec<EnvVarGuard> {
    METABASE_ENV_VARS
        .iter()
        .map(|key| set_env_var(*key, None))
        .collect()
}
