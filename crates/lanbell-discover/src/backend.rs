//! The registration capability shared by both discovery backends.

use tokio::sync::watch;

use crate::error::DiscoverError;
use crate::service::{RegistrationHandle, RegistrationPhase, ServiceDescriptor};

/// One mDNS/DNS-SD advertisement backend.
///
/// Each backend keeps at most one advertisement live; a second `register`
/// retires the previous one first. Switching between backends requires a
/// full `unregister` on the old backend before registering with the new one.
pub trait DiscoveryBackend {
    /// Advertise `descriptor`, returning the handle for the live
    /// registration.
    ///
    /// For callback-based backends the advertisement is in flight when this
    /// returns; observe [`DiscoveryBackend::completion`] for the outcome.
    fn register(
        &mut self,
        descriptor: &ServiceDescriptor,
    ) -> Result<RegistrationHandle, DiscoverError>;

    /// Retract the advertisement identified by `handle`.
    ///
    /// Must be callable exactly once per handle whether the registration is
    /// pending or confirmed, and must tolerate a backend that has nothing
    /// advertised.
    fn unregister(&mut self, handle: RegistrationHandle) -> Result<(), DiscoverError>;

    /// Completion channel for backends that confirm registration
    /// asynchronously. `None` when registration completes inside
    /// [`DiscoveryBackend::register`].
    fn completion(&self) -> Option<watch::Receiver<RegistrationPhase>> {
        None
    }

    /// Service the backend's event loop.
    ///
    /// Callback-based backends need this called periodically while an
    /// advertisement is live; the default is a no-op.
    fn poll(&self) -> Result<(), DiscoverError> {
        Ok(())
    }
}
