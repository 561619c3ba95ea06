//! Configuration module for the Zentura backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Placeholder marker left in unedited config templates.
const PLACEHOLDER_MARKER: &str = "YOUR_";

/// Which data backend the gateway should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Hosted backend when configured, local key-value store otherwise
    Auto,
    /// Always the local key-value store
    Local,
    /// No backend at all: static defaults only
    None,
}

impl BackendMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(BackendMode::Auto),
            "local" => Some(BackendMode::Local),
            "none" => Some(BackendMode::None),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted backend project URL
    pub supabase_url: Option<String>,
    /// Hosted backend public (anon) key
    pub supabase_anon_key: Option<String>,
    /// Storage bucket for uploaded images
    pub storage_bucket: String,
    /// Domain appended to bare admin usernames at login
    pub login_domain: String,
    /// Backend selection
    pub backend: BackendMode,
    /// Path to the SQLite file backing the local key-value store
    pub db_path: PathBuf,
    /// Credentials seeded into the local store
    pub admin_username: String,
    pub admin_password: String,
    /// Upper bound on the admin allow-list check
    pub admin_check_timeout: Duration,
    /// Age after which an admitted token is checked with the backend again
    pub session_revalidate_after: Duration,
    /// Sessions unused for this long are dropped
    pub session_idle_ttl: Duration,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let supabase_url = non_empty_var("SUPABASE_URL");
        let supabase_anon_key = non_empty_var("SUPABASE_ANON_KEY");

        let storage_bucket =
            env::var("ZENTURA_STORAGE_BUCKET").unwrap_or_else(|_| "zentura-images".to_string());

        let login_domain =
            env::var("ZENTURA_LOGIN_DOMAIN").unwrap_or_else(|_| "yourdomain.com".to_string());

        let backend_raw = env::var("ZENTURA_BACKEND").unwrap_or_else(|_| "auto".to_string());
        let backend = BackendMode::from_str(&backend_raw).ok_or_else(|| {
            AppError::Validation(format!("Invalid ZENTURA_BACKEND value: {}", backend_raw))
        })?;

        let db_path = env::var("ZENTURA_DB_PATH")
            .unwrap_or_else(|_| "./data/zentura.sqlite".to_string())
            .into();

        let admin_username = env::var("ZENTURA_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            env::var("ZENTURA_ADMIN_PASSWORD").unwrap_or_else(|_| "zentura-admin".to_string());

        let timeout_ms = match env::var("ZENTURA_ADMIN_CHECK_TIMEOUT_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Validation(format!("Invalid ZENTURA_ADMIN_CHECK_TIMEOUT_MS: {}", raw))
            })?,
            Err(_) => 6000,
        };

        let revalidate_secs = secs_var("ZENTURA_SESSION_REVALIDATE_SECS", 300)?;
        let idle_secs = secs_var("ZENTURA_SESSION_IDLE_SECS", 12 * 60 * 60)?;

        let bind_raw = env::var("ZENTURA_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid ZENTURA_BIND_ADDR format: {}", bind_raw)))?;

        let log_level = env::var("ZENTURA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            storage_bucket,
            login_domain,
            backend,
            db_path,
            admin_username,
            admin_password,
            admin_check_timeout: Duration::from_millis(timeout_ms),
            session_revalidate_after: Duration::from_secs(revalidate_secs),
            session_idle_ttl: Duration::from_secs(idle_secs),
            bind_addr,
            log_level,
        })
    }

    /// Both hosted-backend values present and neither left as a template placeholder.
    pub fn has_supabase_config(&self) -> bool {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) => {
                !url.contains(PLACEHOLDER_MARKER) && !key.contains(PLACEHOLDER_MARKER)
            }
            _ => false,
        }
    }

    /// Expand a bare username into a login email.
    pub fn login_email(&self, user: &str) -> String {
        let user = user.trim();
        if user.contains('@') {
            user.to_string()
        } else {
            format!("{}@{}", user, self.login_domain)
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_var(key: &str, default: u64) -> Result<u64, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| AppError::Validation(format!("Invalid {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            supabase_url: None,
            supabase_anon_key: None,
            storage_bucket: "zentura-images".to_string(),
            login_domain: "zentura.in".to_string(),
            backend: BackendMode::Auto,
            db_path: PathBuf::from("./data/zentura.sqlite"),
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
            admin_check_timeout: Duration::from_secs(6),
            session_revalidate_after: Duration::from_secs(300),
            session_idle_ttl: Duration::from_secs(12 * 60 * 60),
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("SUPABASE_URL");
        env::remove_var("SUPABASE_ANON_KEY");
        env::remove_var("ZENTURA_STORAGE_BUCKET");
        env::remove_var("ZENTURA_BACKEND");
        env::remove_var("ZENTURA_DB_PATH");
        env::remove_var("ZENTURA_ADMIN_CHECK_TIMEOUT_MS");
        env::remove_var("ZENTURA_SESSION_REVALIDATE_SECS");
        env::remove_var("ZENTURA_SESSION_IDLE_SECS");
        env::remove_var("ZENTURA_BIND_ADDR");
        env::remove_var("ZENTURA_LOG_LEVEL");

        let config = Config::from_env().unwrap();

        assert!(!config.has_supabase_config());
        assert_eq!(config.storage_bucket, "zentura-images");
        assert_eq!(config.backend, BackendMode::Auto);
        assert_eq!(config.db_path, PathBuf::from("./data/zentura.sqlite"));
        assert_eq!(config.admin_check_timeout, Duration::from_millis(6000));
        assert_eq!(config.session_revalidate_after, Duration::from_secs(300));
        assert_eq!(config.session_idle_ttl, Duration::from_secs(43200));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_placeholder_values_do_not_count_as_configured() {
        let mut config = sample();
        config.supabase_url = Some("https://YOUR_PROJECT.supabase.co".to_string());
        config.supabase_anon_key = Some("anon".to_string());
        assert!(!config.has_supabase_config());

        config.supabase_url = Some("https://abc.supabase.co".to_string());
        assert!(config.has_supabase_config());

        config.supabase_anon_key = Some("YOUR_ANON_KEY".to_string());
        assert!(!config.has_supabase_config());
    }

    #[test]
    fn test_login_email_expansion() {
        let config = sample();
        assert_eq!(config.login_email("ops"), "ops@zentura.in");
        assert_eq!(config.login_email(" ops@other.com "), "ops@other.com");
    }

    #[test]
    fn test_backend_mode_parsing() {
        assert_eq!(BackendMode::from_str("LOCAL"), Some(BackendMode::Local));
        assert_eq!(BackendMode::from_str("none"), Some(BackendMode::None));
        assert_eq!(BackendMode::from_str("cloud"), None);
    }
}
