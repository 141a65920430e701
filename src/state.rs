use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<AppConfig>,
    /// Present only when a JWT secret is configured.
    pub jwt: Option<Arc<JwtKeys>>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: AppConfig) -> Self {
        let jwt = config.jwt.as_ref().map(|cfg| Arc::new(JwtKeys::from_config(cfg)));
        Self {
            storage,
            config: Arc::new(config),
            jwt,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory storage with authentication disabled.
    pub fn fake() -> Self {
        Self::new(Arc::new(crate::storage::memory::MemoryStorage::new()), test_config(None))
    }

    /// In-memory storage with authentication enabled.
    pub fn fake_with_auth() -> Self {
        let jwt = crate::config::JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        };
        Self::new(
            Arc::new(crate::storage::memory::MemoryStorage::new()),
            test_config(Some(jwt)),
        )
    }
}

#[cfg(test)]
fn test_config(jwt: Option<crate::config::JwtConfig>) -> AppConfig {
    use crate::config::{DatabaseConfig, HttpConfig, MigrationConfig};
    use crate::migrate::MigrationMode;

    AppConfig {
        env: "test".into(),
        database: DatabaseConfig {
            url: None,
            host: "localhost".into(),
            port: 5432,
            user: "postgres".into(),
            password: "postgres".into(),
            name: "postgres".into(),
            max_connections: 1,
        },
        http: HttpConfig {
            host: "127.0.0.1".into(),
            port: 0,
            timeout_secs: 5,
            allowed_origins: vec![],
        },
        migrations: MigrationConfig {
            dir: "./migrations".into(),
            mode: MigrationMode::Skip,
        },
        jwt,
    }
}
