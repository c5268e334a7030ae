//! Ephemeral key/value store adapters.
//!
//! Everything leadline remembers between messages lives behind [`KvStore`]:
//! string values with per-key TTLs, plus the atomic set-if-absent used for
//! claims. [`RedisStore`] is the production backend; [`MemoryStore`] backs
//! tests and local development.

pub mod error;
mod kv;
mod memory;
mod redis_store;

pub use {
    error::{Error, Result},
    kv::KvStore,
    memory::MemoryStore,
    redis_store::RedisStore,
};
