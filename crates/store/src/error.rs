use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to store at {url}")]
    Connect {
        url: String,
        #[source]
        source: redis::RedisError,
    },

    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, Error>;
