use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Valkey (or Redis) behind a reconnecting `ConnectionManager`.
#[derive(Clone)]
pub struct ValkeyClient {
    manager: ConnectionManager,
}

impl std::fmt::Debug for ValkeyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyClient").finish_non_exhaustive()
    }
}

impl ValkeyClient {
    /// Connect to `redis://host:port[/db]` and check the server answers.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        let this = Self { manager };
        this.ping().await?;

        Ok(this)
    }

    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.manager.clone();

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn fetch(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.manager.clone();

        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::command("GET", e))
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.manager.clone();

        // EX takes whole seconds; sub-second TTLs round up to one.
        let seconds = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CacheError::command("SET", e))
    }

    async fn evict(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.manager.clone();

        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|e| CacheError::command("DEL", e))?;

        Ok(removed > 0)
    }
}
