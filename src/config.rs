use std::{str::FromStr, time::Duration};

use anyhow::{bail, Context};
use sqlx::postgres::PgConnectOptions;

use crate::migrate::MigrationMode;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Takes precedence over the discrete settings when present.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub dir: String,
    pub mode: MigrationMode,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub migrations: MigrationConfig,
    /// `None` disables token authentication entirely.
    pub jwt: Option<JwtConfig>,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

impl HttpConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// One year.
pub const MAX_JWT_TTL_MINUTES: i64 = 365 * 24 * 60;

fn jwt_ttl(minutes: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_JWT_TTL_MINUTES).contains(&minutes) {
        bail!("JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL").ok(),
            host: var_or("DB_HOST", "localhost"),
            port: parse_var("DB_PORT", 5432)?,
            user: var_or("DB_USER", "postgres"),
            password: var_or("DB_PASSWORD", "postgres"),
            name: var_or("DB_NAME", "postgres"),
            max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
        };

        let http = HttpConfig {
            host: var_or("APP_HOST", "0.0.0.0"),
            port: parse_var("APP_PORT", 8080)?,
            timeout_secs: parse_var("HTTP_TIMEOUT_SECS", 4)?,
            allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        };

        let migrations = MigrationConfig {
            dir: var_or("MIGRATIONS_DIR", "./migrations"),
            mode: parse_var("MIGRATIONS_MODE", MigrationMode::Up)?,
        };

        let jwt = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => Some(JwtConfig {
                secret,
                issuer: var_or("JWT_ISSUER", "taskhub"),
                audience: var_or("JWT_AUDIENCE", "taskhub-users"),
                ttl_minutes: jwt_ttl(parse_var("JWT_TTL_MINUTES", 60)?)?,
            }),
            _ => None,
        };

        Ok(Self {
            env: var_or("APP_ENV", "local"),
            database,
            http,
            migrations,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(
            split_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn jwt_ttl_is_bounded() {
        assert_eq!(jwt_ttl(60).unwrap(), 60);
        assert_eq!(jwt_ttl(MAX_JWT_TTL_MINUTES).unwrap(), MAX_JWT_TTL_MINUTES);
        assert!(jwt_ttl(0).is_err());
        assert!(jwt_ttl(-5).is_err());
        assert!(jwt_ttl(MAX_JWT_TTL_MINUTES + 1).is_err());
        assert!(jwt_ttl(i64::MAX).is_err());
    }

    #[test]
    fn connect_options_prefer_url() {
        let cfg = DatabaseConfig {
            url: Some("postgres://u:p@db.internal:6543/app".into()),
            host: "localhost".into(),
            port: 5432,
            user: "postgres".into(),
            password: "postgres".into(),
            name: "postgres".into(),
            max_connections: 10,
        };
        let opts = cfg.connect_options().expect("valid url");
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 6543);
    }

    #[test]
    fn http_address_joins_host_and_port() {
        let http = HttpConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            timeout_secs: 4,
            allowed_origins: vec![],
        };
        assert_eq!(http.address(), "127.0.0.1:9000");
        assert_eq!(http.timeout(), Duration::from_secs(4));
    }
}
