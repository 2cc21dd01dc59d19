use api_client::Failure;
use core_types::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown tool '{0}'")]
    UnknownOperation(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.message)]
    Transport(Failure),

    #[error("failed to assemble the export request: {0}")]
    Request(#[from] api_client::error::ApiError),

    #[error("internal error: {0}")]
    Internal(String),
}
