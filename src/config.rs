/*
 * Responsibility
 * - 環境変数 (.env 含む) の読み込み
 * - 設定値のバリデーション (不足・不正なら起動失敗。リクエスト単位のエラーにはしない)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

pub const ACCESS_TOKEN_SECRET: &str = "SECURITY_ACCESS_TOKEN_SECRET";
pub const ACCESS_TOKEN_VALIDITY_IN_MINUTES: &str = "SECURITY_ACCESS_TOKEN_VALIDITY_IN_MINUTES";
pub const PASSWORD_HASH_COST: &str = "SECURITY_PASSWORD_HASH_COST";
pub const HTTP_REQUEST_TIMEOUT_SECS: &str = "HTTP_REQUEST_TIMEOUT_SECS";
pub const HTTP_BODY_LIMIT_BYTES: &str = "HTTP_BODY_LIMIT_BYTES";

// bcrypt cost: below 10 is too cheap, above 14 makes every login slow
pub const MIN_PASSWORD_HASH_COST: u32 = 10;
pub const MAX_PASSWORD_HASH_COST: u32 = 14;
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Limits applied to every HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub http: HttpSettings,

    // HMAC key material for access tokens
    pub access_token_secret: String,
    pub access_token_validity: TimeDelta,
    pub password_hash_cost: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("http", &self.http)
            .field("access_token_secret", &"<redacted>")
            .field("access_token_validity", &self.access_token_validity)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let access_token_secret =
            lookup(ACCESS_TOKEN_SECRET).ok_or(ConfigError::Missing(ACCESS_TOKEN_SECRET))?;
        if access_token_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(ACCESS_TOKEN_SECRET));
        }

        let validity_minutes: f64 = lookup(ACCESS_TOKEN_VALIDITY_IN_MINUTES)
            .ok_or(ConfigError::Missing(ACCESS_TOKEN_VALIDITY_IN_MINUTES))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(ACCESS_TOKEN_VALIDITY_IN_MINUTES))?;
        let access_token_validity = validity_from_minutes(validity_minutes)
            .ok_or(ConfigError::Invalid(ACCESS_TOKEN_VALIDITY_IN_MINUTES))?;

        let password_hash_cost: u32 =
            optional(&lookup, PASSWORD_HASH_COST, DEFAULT_PASSWORD_HASH_COST)?;
        if !(MIN_PASSWORD_HASH_COST..=MAX_PASSWORD_HASH_COST).contains(&password_hash_cost) {
            return Err(ConfigError::Invalid(PASSWORD_HASH_COST));
        }

        let defaults = HttpSettings::default();
        let timeout_secs: u64 = optional(
            &lookup,
            HTTP_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        )?;
        let body_limit_bytes: usize =
            optional(&lookup, HTTP_BODY_LIMIT_BYTES, defaults.body_limit_bytes)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(HTTP_REQUEST_TIMEOUT_SECS));
        }
        if body_limit_bytes == 0 {
            return Err(ConfigError::Invalid(HTTP_BODY_LIMIT_BYTES));
        }

        Ok(Self {
            addr,
            app_env,
            http: HttpSettings {
                request_timeout: Duration::from_secs(timeout_secs),
                body_limit_bytes,
            },
            access_token_secret,
            access_token_validity,
            password_hash_cost,
        })
    }
}

// Absent → default; present but unparsable → error (never silently defaulted).
fn optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
    }
}

// Millisecond precision; `None` for non-finite, non-positive or unrepresentable values.
fn validity_from_minutes(minutes: f64) -> Option<TimeDelta> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return None;
    }
    let millis = (minutes * 60_000.0).round();
    if millis < 1.0 || millis >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn loads_required_security_settings() {
        let config = load(&[
            (ACCESS_TOKEN_SECRET, "KA0234JVASFMBEH34BCV"),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "20"),
        ])
        .unwrap();

        assert_eq!(config.access_token_secret, "KA0234JVASFMBEH34BCV");
        assert_eq!(config.access_token_validity, TimeDelta::minutes(20));
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.password_hash_cost, DEFAULT_PASSWORD_HASH_COST);
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn fractional_minutes_are_kept() {
        let config = load(&[
            (ACCESS_TOKEN_SECRET, "s"),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "0.5"),
        ])
        .unwrap();
        assert_eq!(config.access_token_validity, TimeDelta::seconds(30));
    }

    #[test]
    fn missing_secret_fails() {
        let err = load(&[(ACCESS_TOKEN_VALIDITY_IN_MINUTES, "20")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ACCESS_TOKEN_SECRET));
    }

    #[test]
    fn blank_secret_fails() {
        let err = load(&[
            (ACCESS_TOKEN_SECRET, "   "),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "20"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid(ACCESS_TOKEN_SECRET));
    }

    #[test]
    fn missing_validity_fails() {
        let err = load(&[(ACCESS_TOKEN_SECRET, "s")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ACCESS_TOKEN_VALIDITY_IN_MINUTES));
    }

    #[test]
    fn unusable_validity_fails() {
        for raw in ["abc", "", "0", "-5", "NaN", "inf", "1e300"] {
            let err = load(&[
                (ACCESS_TOKEN_SECRET, "s"),
                (ACCESS_TOKEN_VALIDITY_IN_MINUTES, raw),
            ])
            .unwrap_err();
            assert_eq!(err, ConfigError::Invalid(ACCESS_TOKEN_VALIDITY_IN_MINUTES), "{raw:?}");
        }
    }

    #[test]
    fn production_env_and_port() {
        let config = load(&[
            ("APP_ENV", "PROD"),
            ("PORT", "8080"),
            (ACCESS_TOKEN_SECRET, "s"),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "1"),
        ])
        .unwrap();
        assert!(config.app_env.is_production());
        assert_eq!(config.addr.port(), 8080);
    }

    #[test]
    fn password_hash_cost_must_stay_in_range() {
        let config = load(&[
            (ACCESS_TOKEN_SECRET, "s"),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "1"),
            (PASSWORD_HASH_COST, "14"),
        ])
        .unwrap();
        assert_eq!(config.password_hash_cost, 14);

        for raw in ["4", "9", "15", "twelve"] {
            let err = load(&[
                (ACCESS_TOKEN_SECRET, "s"),
                (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "1"),
                (PASSWORD_HASH_COST, raw),
            ])
            .unwrap_err();
            assert_eq!(err, ConfigError::Invalid(PASSWORD_HASH_COST), "{raw:?}");
        }
    }

    #[test]
    fn http_limits_are_configurable() {
        let config = load(&[
            (ACCESS_TOKEN_SECRET, "s"),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "1"),
            (HTTP_REQUEST_TIMEOUT_SECS, "5"),
            (HTTP_BODY_LIMIT_BYTES, "2048"),
        ])
        .unwrap();
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));
        assert_eq!(config.http.body_limit_bytes, 2048);

        for (key, raw) in [
            (HTTP_REQUEST_TIMEOUT_SECS, "0"),
            (HTTP_REQUEST_TIMEOUT_SECS, "-1"),
            (HTTP_BODY_LIMIT_BYTES, "0"),
            (HTTP_BODY_LIMIT_BYTES, "1MiB"),
        ] {
            let err = load(&[
                (ACCESS_TOKEN_SECRET, "s"),
                (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "1"),
                (key, raw),
            ])
            .unwrap_err();
            assert_eq!(err, ConfigError::Invalid(key), "{key}={raw:?}");
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let config = load(&[
            (ACCESS_TOKEN_SECRET, "super-secret"),
            (ACCESS_TOKEN_VALIDITY_IN_MINUTES, "1"),
        ])
        .unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
