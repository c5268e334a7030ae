use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] leadline_store::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid session record under {key}")]
    InvalidRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
