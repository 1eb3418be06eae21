//! Redis slot backend.
//!
//! A slot maps to one Redis key holding the encoded cart. Several app
//! instances pointed at the same key behave like browsing contexts sharing
//! one storage scope: last writer wins.

use super::StorageBackend;
use crate::error::{Error, Result};
use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Pool, Runtime};
use std::time::Duration;

/// Pool statistics information.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub connections: u32,
    pub idle_connections: u32,
}

/// Default Redis connection pool size.
/// Override with REDIS_POOL_SIZE environment variable
const DEFAULT_POOL_SIZE: u32 = 8;

/// Configuration for Redis backend.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u32,
    pub pool_size: u32,
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Build Redis connection string.
    pub fn connection_string(&self) -> String {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!(
                "redis://{}:{}@{}:{}/{}",
                username, password, self.host, self.port, self.database
            ),
            (None, Some(password)) => format!(
                "redis://default:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            ),
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

/// Redis backend with connection pooling.
///
/// # Example
///
/// ```no_run
/// # use cart_kit::backend::{RedisBackend, RedisConfig, StorageBackend};
/// # async fn example() -> cart_kit::Result<()> {
/// let backend = RedisBackend::new(RedisConfig::default()).await?;
/// backend.set("cart", b"[]".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create new Redis backend from configuration.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let mut cfg = PoolConfig::from_url(config.connection_string());
        let mut pool_cfg = deadpool_redis::PoolConfig::new(config.pool_size as usize);
        pool_cfg.timeouts.wait = Some(config.connection_timeout);
        pool_cfg.timeouts.create = Some(config.connection_timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::BackendError(format!("Failed to create Redis pool: {}", e)))?;

        info!(
            "✓ Redis backend initialized: {}:{}",
            config.host, config.port
        );

        Ok(RedisBackend { pool })
    }

    /// Create from connection string directly.
    ///
    /// Pool size comes from `REDIS_POOL_SIZE` when set, else the default.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub async fn from_connection_string(conn_str: &str) -> Result<Self> {
        let pool_size = std::env::var("REDIS_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        let mut cfg = PoolConfig::from_url(conn_str);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(pool_size as usize));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::BackendError(format!("Failed to create Redis pool: {}", e)))?;

        info!(
            "✓ Redis backend initialized from connection string (pool size: {})",
            pool_size
        );

        Ok(RedisBackend { pool })
    }

    /// Get current pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            connections: status.size as u32,
            idle_connections: status.available as u32,
        }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::BackendError(format!("Failed to get Redis connection: {}", e)))
    }
}

impl StorageBackend for RedisBackend {
    async fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(slot)
            .await
            .map_err(|e| Error::BackendError(format!("Redis GET failed for slot {}: {}", slot, e)))?;

        if value.is_some() {
            debug!("✓ Redis GET {} -> HIT", slot);
        } else {
            debug!("✓ Redis GET {} -> MISS", slot);
        }

        Ok(value)
    }

    async fn set(&self, slot: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.connection().await?;

        conn.set::<_, _, ()>(slot, value)
            .await
            .map_err(|e| Error::BackendError(format!("Redis SET failed for slot {}: {}", slot, e)))?;

        debug!("✓ Redis SET {}", slot);
        Ok(())
    }

    async fn delete(&self, slot: &str) -> Result<()> {
        let mut conn = self.connection().await?;

        conn.del::<_, ()>(slot)
            .await
            .map_err(|e| Error::BackendError(format!("Redis DEL failed for slot {}: {}", slot, e)))?;

        debug!("✓ Redis DELETE {}", slot);
        Ok(())
    }

    async fn exists(&self, slot: &str) -> Result<bool> {
        let mut conn = self.connection().await?;

        let exists: bool = conn.exists(slot).await.map_err(|e| {
            Error::BackendError(format!("Redis EXISTS failed for slot {}: {}", slot, e))
        })?;

        Ok(exists)
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;

        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis PING failed: {}", e)))?;

        Ok(pong.contains("PONG"))
    }
}
