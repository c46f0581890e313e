//! Error types for the responder.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors that can occur while starting or running the responder.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The socket could not be bound.
    #[error("could not bind {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying socket error.
        source: std::io::Error,
    },

    /// `start` was called while the responder was already serving.
    #[error("responder is already running")]
    AlreadyRunning,
}
