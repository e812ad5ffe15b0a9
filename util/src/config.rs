//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    /// Public URL the scannable check-in links are built from.
    pub app_base_url: String,
    pub qr_default_expires_minutes: i64,
    pub qr_default_late_after_minutes: i32,
    /// Offset of the school's wall clock from UTC. Session dates and times are
    /// stored as local wall-clock values and interpreted with this offset.
    pub school_utc_offset_minutes: i32,
}

pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_QR_EXPIRES_MINUTES: i64 = 60;
pub const DEFAULT_QR_LATE_AFTER_MINUTES: i32 = 15;

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring malformed config value");
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a default so the server and the test harness can start
    /// from an empty environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = var_or("APP_BASE_URL", DEFAULT_APP_BASE_URL);
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_APP_BASE_URL.to_string()
        } else {
            base_url
        };

        Self {
            env: var_or("APP_ENV", "development"),
            project_name: var_or("PROJECT_NAME", "present"),
            log_level: var_or("LOG_LEVEL", "api=info,db=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            database_path: var_or("DATABASE_PATH", "data/present.db"),
            host: var_or("HOST", "127.0.0.1"),
            port: parse_or("PORT", 3000),
            app_base_url: base_url,
            qr_default_expires_minutes: parse_or(
                "QR_DEFAULT_EXPIRES_MINUTES",
                DEFAULT_QR_EXPIRES_MINUTES,
            ),
            qr_default_late_after_minutes: parse_or(
                "QR_DEFAULT_LATE_AFTER_MINUTES",
                DEFAULT_QR_LATE_AFTER_MINUTES,
            ),
            school_utc_offset_minutes: parse_or("SCHOOL_UTC_OFFSET_MINUTES", 0),
        }
    }

    /// Returns a snapshot of the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            if let Ok(mut guard) = lock.write() {
                *guard = AppConfig::from_env();
            }
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_app_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.app_base_url = value.into());
    }
}

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn app_base_url() -> String {
    AppConfig::global().app_base_url.clone()
}

pub fn qr_default_expires_minutes() -> i64 {
    AppConfig::global().qr_default_expires_minutes
}

pub fn qr_default_late_after_minutes() -> i32 {
    AppConfig::global().qr_default_late_after_minutes
}

pub fn school_utc_offset_minutes() -> i32 {
    AppConfig::global().school_utc_offset_minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear(keys: &[&str]) {
        for key in keys {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_on_empty_environment() {
        clear(&[
            "APP_BASE_URL",
            "QR_DEFAULT_EXPIRES_MINUTES",
            "QR_DEFAULT_LATE_AFTER_MINUTES",
            "SCHOOL_UTC_OFFSET_MINUTES",
            "PORT",
        ]);

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.app_base_url, DEFAULT_APP_BASE_URL);
        assert_eq!(cfg.qr_default_expires_minutes, 60);
        assert_eq!(cfg.qr_default_late_after_minutes, 15);
        assert_eq!(cfg.school_utc_offset_minutes, 0);
        assert_eq!(cfg.port, 3000);
    }

    #[test]
    #[serial]
    fn malformed_numbers_fall_back() {
        unsafe {
            env::set_var("QR_DEFAULT_EXPIRES_MINUTES", "soon");
            env::set_var("PORT", "-1");
        }

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.qr_default_expires_minutes, DEFAULT_QR_EXPIRES_MINUTES);
        assert_eq!(cfg.port, 3000);

        clear(&["QR_DEFAULT_EXPIRES_MINUTES", "PORT"]);
    }

    #[test]
    #[serial]
    fn blank_base_url_uses_local_default() {
        unsafe { env::set_var("APP_BASE_URL", "   ") };
        assert_eq!(AppConfig::from_env().app_base_url, DEFAULT_APP_BASE_URL);
        clear(&["APP_BASE_URL"]);
    }
}
