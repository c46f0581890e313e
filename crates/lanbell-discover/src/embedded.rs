//! Embedded mDNS responder backend.
//!
//! Owns an in-process mDNS stack bound to the host's interfaces and answers
//! discovery queries itself, independent of any OS daemon. Registration
//! completes (or fails) inside the `register` call.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use mdns_sd::{ServiceDaemon, ServiceInfo};
use tracing::{debug, info, warn};

use crate::backend::DiscoveryBackend;
use crate::error::DiscoverError;
use crate::lock::{MulticastGuard, MulticastLock, NoopMulticastLock};
use crate::service::{RegistrationHandle, ServiceDescriptor, SERVICE_TYPE};

/// How long unregistration waits for the daemon's acknowledgement.
const UNREGISTER_WAIT: Duration = Duration::from_secs(1);

/// Advertises a service record from an in-process mDNS responder.
pub struct EmbeddedBackend {
    daemon: Option<ServiceDaemon>,
    active: Option<String>,
    lock: Arc<dyn MulticastLock>,
}

impl EmbeddedBackend {
    /// Create a backend with no platform multicast permit.
    pub fn new() -> Self {
        Self::with_lock(Arc::new(NoopMulticastLock))
    }

    /// Create a backend that takes `lock` around each registration.
    pub fn with_lock(lock: Arc<dyn MulticastLock>) -> Self {
        Self {
            daemon: None,
            active: None,
            lock,
        }
    }

    /// Whether an advertisement is currently live.
    pub fn is_advertising(&self) -> bool {
        self.active.is_some()
    }

    /// Retract the live record, if any, leaving the daemon running.
    fn retire_active(&mut self) {
        let Some(fullname) = self.active.take() else {
            return;
        };
        let Some(daemon) = &self.daemon else {
            return;
        };
        match daemon.unregister(&fullname) {
            Ok(receiver) => match receiver.recv_timeout(UNREGISTER_WAIT) {
                Ok(status) => {
                    debug!(fullname = %fullname, ?status, "Previous advertisement retired")
                }
                Err(_) => {
                    warn!(fullname = %fullname, "No unregister acknowledgement from mDNS responder")
                }
            },
            Err(e) => {
                warn!(fullname = %fullname, error = %e, "Failed to retire previous advertisement")
            }
        }
    }
}

impl Default for EmbeddedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryBackend for EmbeddedBackend {
    fn register(
        &mut self,
        descriptor: &ServiceDescriptor,
    ) -> Result<RegistrationHandle, DiscoverError> {
        // One live advertisement per backend instance.
        self.retire_active();

        if self.daemon.is_none() {
            let daemon = ServiceDaemon::new().map_err(|e| DiscoverError::Mdns(e.to_string()))?;
            self.daemon = Some(daemon);
        }
        let Some(daemon) = self.daemon.as_ref() else {
            return Err(DiscoverError::Mdns("mDNS responder unavailable".to_string()));
        };

        let host = local_host_name();
        let attributes = descriptor.txt_attributes();
        let record = ServiceInfo::new(
            &format!("{SERVICE_TYPE}.local."),
            &descriptor.name,
            &host,
            IpAddr::V4(descriptor.address),
            descriptor.port,
            &attributes[..],
        )
        .map_err(|e| DiscoverError::ServiceRecord(e.to_string()))?;
        let fullname = record.get_fullname().to_string();

        {
            // The permit spans exactly the registration call.
            let _guard = MulticastGuard::hold(self.lock.as_ref())?;
            daemon
                .register(record)
                .map_err(|e| DiscoverError::Registration(e.to_string()))?;
        }

        info!(
            fullname = %fullname,
            address = %descriptor.address,
            port = descriptor.port,
            "Advertising via embedded mDNS responder"
        );
        self.active = Some(fullname.clone());
        Ok(RegistrationHandle::new(fullname))
    }

    fn unregister(&mut self, handle: RegistrationHandle) -> Result<(), DiscoverError> {
        self.active = None;
        let Some(daemon) = self.daemon.take() else {
            debug!(fullname = %handle.fullname(), "No embedded advertisement to retract");
            return Ok(());
        };

        let retraction = daemon
            .unregister(handle.fullname())
            .map_err(|e| DiscoverError::Unregistration(e.to_string()))
            .map(|receiver| {
                if receiver.recv_timeout(UNREGISTER_WAIT).is_err() {
                    warn!(
                        fullname = %handle.fullname(),
                        "No unregister acknowledgement from mDNS responder"
                    );
                }
            });

        // Close the stack instance whether or not the retraction was
        // acknowledged.
        if let Err(e) = daemon.shutdown() {
            warn!(error = %e, "mDNS responder shutdown failed");
        }

        retraction?;
        info!(fullname = %handle.fullname(), "Stopped embedded mDNS advertisement");
        Ok(())
    }
}

/// Host name for the advertised record, in the `.local.` zone.
fn local_host_name() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "lanbell".to_string());
    format!("{host}.local.")
}
