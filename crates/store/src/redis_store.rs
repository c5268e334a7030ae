//! Redis-backed store.

use std::{future::Future, time::Duration};

use {
    redis::{AsyncCommands, aio::ConnectionManager},
    tracing::warn,
};

use crate::{
    error::{Error, Result},
    kv::KvStore,
};

/// Retries after the initial attempt of a failed write.
const WRITE_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// `KvStore` over a Redis connection manager.
///
/// Writes are retried with a fixed backoff before the error surfaces; reads
/// fail straight through. The connection manager reconnects on its own, so a
/// retried write after a dropped connection usually lands.
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store. Callers treat a failure here as fatal, so the
    /// error carries the target url.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url.to_string()).map_err(|source| Error::Connect {
            url: url.to_string(),
            source,
        })?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|source| Error::Connect {
                url: url.to_string(),
                source,
            })?;
        Ok(Self { manager })
    }

    async fn write_with_retry<T, F, Fut>(&self, key: &str, mut op: F) -> Result<T>
    where
        F: FnMut(ConnectionManager) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(self.manager.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < WRITE_RETRIES => {
                    attempt += 1;
                    warn!(key, attempt, error = %e, "store write failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                },
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait::async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.write_with_retry(key, |mut conn| {
            let (key, value) = (key.to_string(), value.to_string());
            async move { conn.set_ex::<_, _, ()>(key, value, ttl_secs).await }
        })
        .await
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool> {
        self.write_with_retry(key, |mut conn| {
            let (key, value) = (key.to_string(), value.to_string());
            async move {
                // SET NX EX replies OK when the key was set, nil otherwise.
                let reply: Option<String> = redis::cmd("SET")
                    .arg(&key)
                    .arg(&value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_secs)
                    .query_async(&mut conn)
                    .await?;
                Ok(reply.is_some())
            }
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.write_with_retry(key, |mut conn| {
            let key = key.to_string();
            async move { conn.del::<_, ()>(key).await }
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let found: bool = conn.exists(key).await?;
        Ok(found)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }
}
