use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("sheet request failed with status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("sheet is missing required header {header:?}")]
    MissingHeader { header: &'static str },

    #[error("company record {company_id:?} is missing required field {field:?}")]
    InvalidRecord { company_id: String, field: String },
}

pub type Result<T> = std::result::Result<T, Error>;
