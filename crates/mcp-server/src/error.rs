use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("stdio error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response writer stopped unexpectedly: {0}")]
    Writer(#[from] tokio::task::JoinError),
}
