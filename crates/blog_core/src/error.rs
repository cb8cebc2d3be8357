use thiserror::Error;

use crate::content::article::ArticleId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch failed: {0}")]
    FetchFailure(#[from] FetchFailure),

    #[error("Article '{0}' not found")]
    NotFound(ArticleId),
}

/// Reasons a request to the content provider produced no usable page or article.
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<serde_json::Error> for FetchFailure {
    fn from(error: serde_json::Error) -> Self {
        FetchFailure::Malformed(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::FetchFailure(error.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
