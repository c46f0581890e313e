//! Multicast permit handling for the embedded responder.
//!
//! Some platforms suppress multicast while radios power-save and require an
//! explicit permit before mDNS traffic flows. The permit is held for the
//! shortest possible span: taken immediately before a registration and
//! returned when the guard drops, on every exit path.

use crate::error::DiscoverError;

/// A platform permit for sending and receiving multicast packets.
pub trait MulticastLock: Send + Sync {
    /// Take the permit. Paired with exactly one `release`.
    fn acquire(&self) -> Result<(), DiscoverError>;

    /// Return the permit.
    fn release(&self);
}

/// Holds an acquired permit and releases it when dropped.
pub struct MulticastGuard<'a> {
    lock: &'a dyn MulticastLock,
}

impl<'a> MulticastGuard<'a> {
    /// Acquire `lock`, returning a guard that releases it on drop.
    pub fn hold(lock: &'a dyn MulticastLock) -> Result<Self, DiscoverError> {
        lock.acquire()?;
        Ok(Self { lock })
    }
}

impl Drop for MulticastGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

/// Permit for hosts whose network stack delivers multicast unconditionally.
#[derive(Debug, Default)]
pub struct NoopMulticastLock;

impl MulticastLock for NoopMulticastLock {
    fn acquire(&self) -> Result<(), DiscoverError> {
        Ok(())
    }

    fn release(&self) {}
}
