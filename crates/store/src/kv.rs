use async_trait::async_trait;

use crate::error::Result;

/// String key/value store with per-key TTLs.
///
/// Every write carries a TTL; the store is the sole owner of record
/// lifetimes and callers re-fetch rather than cache across messages.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value` with a TTL, overwriting any existing entry.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Set `key` only if absent. Returns `true` when this call created the
    /// entry. The atomic primitive behind claim-style writes.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// All live keys matching a glob-style pattern (e.g. `session_*`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;
}
