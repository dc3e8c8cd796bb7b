use std::io::Error as IoError;
use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IoError(#[from] IoError),

    #[error(transparent)]
    Protocol(#[from] crate::protocol::Error),

    /// Sending a datagram failed. Nothing is retried.
    #[error("transport error: {0}")]
    Transport(#[source] IoError),

    /// The response listener's socket failed in a way it can't recover from.
    #[error("response listener failed: {0}")]
    ListenerIo(#[source] IoError),

    #[error("internal error")]
    Internal,
}
