//! Error types for the discover crate.

use thiserror::Error;

/// Errors that can occur during mDNS operations.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The mDNS stack could not be constructed, driven, or shut down.
    #[error("mDNS error: {0}")]
    Mdns(String),

    /// The descriptor could not be expressed as a DNS-SD service record.
    #[error("service record error: {0}")]
    ServiceRecord(String),

    /// The backend rejected the registration.
    #[error("registration failed: {0}")]
    Registration(String),

    /// The advertisement could not be retracted cleanly.
    #[error("unregistration failed: {0}")]
    Unregistration(String),

    /// The multicast permit could not be acquired.
    #[error("multicast lock error: {0}")]
    MulticastLock(String),
}
