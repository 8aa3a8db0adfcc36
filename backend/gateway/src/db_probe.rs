//! MySQL reachability probe: connect, `SELECT 1`, close.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection};
use statusgate_config::DatabaseConfig;
use statusgate_core::DatabaseProbe;

pub struct MySqlProbe {
    options: MySqlConnectOptions,
}

impl MySqlProbe {
    pub fn new(options: MySqlConnectOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.name);
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        Self::new(options)
    }
}

#[async_trait]
impl DatabaseProbe for MySqlProbe {
    fn name(&self) -> &str {
        "mysql"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self
            .options
            .connect()
            .await
            .context("Failed to connect to database")?;
        sqlx::query("SELECT 1")
            .execute(&mut conn)
            .await
            .context("Probe query failed")?;
        conn.close().await.context("Failed to close probe connection")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let config = DatabaseConfig {
            host: "127.0.0.1".into(),
            // Reserved port; nothing listens here.
            port: 1,
            ..DatabaseConfig::default()
        };
        let probe = MySqlProbe::from_config(&config);
        let outcome = tokio::time::timeout(Duration::from_secs(5), probe.ping()).await;
        assert!(matches!(outcome, Ok(Err(_)) | Err(_)));
    }
}
