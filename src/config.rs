use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} not set")]
    Missing(&'static str),
    #[error("environment variable {key} is invalid: {value}")]
    Invalid { key: &'static str, value: String },
}

/// One year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug)]
pub struct EnvConfig {
    pub port: u16,
    pub db_url: String,
    pub secret_key: String,
    pub app_name: String,
    /// Accounts registered with this address get the administrator role.
    pub admin_email: Option<String>,
    /// Public origin used to build the links sent by mail.
    pub base_url: String,
    pub session_ttl_hours: i64,
    pub mail: MailConfig,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub sender: String,
}

impl MailConfig {
    pub fn subject(&self, app_name: &str, subject: &str) -> String {
        format!("[{app_name}] {subject}")
    }
}

impl EnvConfig {
    fn get_env(key: &'static str) -> Result<String, ConfigError> {
        env::var(key).map_err(|_| ConfigError::Missing(key))
    }

    fn get_env_or(key: &'static str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
        match env::var(key) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
            Err(_) => Ok(default),
        }
    }

    fn session_ttl(hours: i64) -> Result<i64, ConfigError> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: hours.to_string(),
            });
        }
        Ok(hours)
    }

    /// Only what the `manage` tool needs, so it runs without the server's secrets.
    pub fn database_url() -> Result<String, ConfigError> {
        dotenv::dotenv().ok();
        Self::get_env("POSTGRES_URI")
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let app_name = Self::get_env_or("APP_NAME", "Account Service");
        let sender = Self::get_env_or("MAIL_SENDER", "noreply@example.com");

        Ok(EnvConfig {
            port: Self::parse_env("PORT", 8080)?,
            db_url: Self::get_env("POSTGRES_URI")?,
            secret_key: Self::get_env("SECRET_KEY")?,
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|e| !e.is_empty()),
            base_url: Self::get_env_or("BASE_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            session_ttl_hours: Self::session_ttl(Self::parse_env("SESSION_TTL_HOURS", 24)?)?,
            mail: MailConfig {
                api_key: env::var("MAIL_API_KEY").ok().filter(|k| !k.is_empty()),
                endpoint: Self::get_env_or("MAIL_ENDPOINT", "https://api.resend.com/emails"),
                sender: format!("{app_name} Admin <{sender}>"),
            },
            app_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_bounds() {
        assert_eq!(EnvConfig::session_ttl(24).unwrap(), 24);
        assert_eq!(EnvConfig::session_ttl(MAX_SESSION_TTL_HOURS).unwrap(), MAX_SESSION_TTL_HOURS);
        for bad in [0, -5, MAX_SESSION_TTL_HOURS + 1, i64::MAX] {
            assert!(matches!(
                EnvConfig::session_ttl(bad),
                Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. })
            ));
        }
    }
}
