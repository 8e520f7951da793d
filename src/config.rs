use std::env;

use crate::constants::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    /// Secret used to sign bearer tokens
    pub app_secret_key: String,
    pub token_ttl_secs: i64,
    /// Enables `/admin/stats` when set
    pub admin_secret_key: Option<String>,
    pub log_requests: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/mantras.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8081".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let app_secret_key = env::var("APP_SECRET_KEY")
            .map_err(|_| "APP_SECRET_KEY must be set for token signing")?;
        if app_secret_key.is_empty() {
            return Err("APP_SECRET_KEY must not be empty".to_string());
        }

        let token_ttl_secs = parse_token_ttl(env::var("TOKEN_TTL_SECS").ok().as_deref())?;

        let admin_secret_key = env::var("ADMIN_SECRET_KEY").ok().filter(|k| !k.is_empty());

        let log_requests = env::var("LOG_REQUESTS")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            environment,
            app_secret_key,
            token_ttl_secs,
            admin_secret_key,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Token lifetime in seconds: positive and at most one year
fn parse_token_ttl(raw: Option<&str>) -> Result<i64, String> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TOKEN_TTL_SECS);
    };

    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|ttl| (1..=MAX_TOKEN_TTL_SECS).contains(ttl))
        .ok_or_else(|| format!("TOKEN_TTL_SECS must be between 1 and {}", MAX_TOKEN_TTL_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 9000,
            database_path: String::new(),
            allowed_origins: vec![],
            environment: "test".to_string(),
            app_secret_key: "secret".to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            admin_secret_key: None,
            log_requests: false,
        };

        assert_eq!(config.server_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_parse_token_ttl() {
        assert_eq!(parse_token_ttl(None), Ok(DEFAULT_TOKEN_TTL_SECS));
        assert_eq!(parse_token_ttl(Some("3600")), Ok(3600));
        assert_eq!(parse_token_ttl(Some(" 60 ")), Ok(60));

        assert!(parse_token_ttl(Some("0")).is_err());
        assert!(parse_token_ttl(Some("-5")).is_err());
        assert!(parse_token_ttl(Some("abc")).is_err());
        assert!(parse_token_ttl(Some("9223372036854775807")).is_err());
    }
}
