use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build the HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Query parameter '{0}' was supplied more than once")]
    DuplicateParameter(String),

    #[error("Query parameter '{0}' is reserved for authentication")]
    ReservedParameter(String),
}
