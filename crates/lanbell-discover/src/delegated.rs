//! Delegated discovery backend.
//!
//! Hands the advertisement to the OS discovery daemon (Avahi on Linux,
//! Bonjour on macOS) instead of answering queries in-process. Registration
//! is submitted asynchronously: `register` returns once the request is in
//! flight, and the daemon's callback delivers confirmation or rejection
//! through the completion channel. The daemon advertises the host's own
//! interface addresses; the descriptor's address is not forwarded on this
//! path.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};
use zeroconf::prelude::*;
use zeroconf::{MdnsService, ServiceRegistration, ServiceType, TxtRecord};

use crate::backend::DiscoveryBackend;
use crate::error::DiscoverError;
use crate::service::{RegistrationHandle, RegistrationPhase, ServiceDescriptor};

/// Advertises a service record through the OS discovery service.
pub struct DelegatedBackend {
    service: Option<MdnsService>,
    event_loop: Option<zeroconf::EventLoop>,
    phase: Option<watch::Receiver<RegistrationPhase>>,
    fullname: Option<String>,
}

impl DelegatedBackend {
    /// Create a backend with nothing advertised.
    pub fn new() -> Self {
        Self {
            service: None,
            event_loop: None,
            phase: None,
            fullname: None,
        }
    }

    /// Whether a registration is live (pending or confirmed).
    pub fn is_advertising(&self) -> bool {
        self.service.is_some()
    }

    /// Drop the submitted registration; the daemon withdraws the record
    /// when the service handle goes away.
    fn teardown(&mut self) {
        self.service = None;
        self.event_loop = None;
        self.phase = None;
        self.fullname = None;
    }
}

impl Default for DelegatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryBackend for DelegatedBackend {
    fn register(
        &mut self,
        descriptor: &ServiceDescriptor,
    ) -> Result<RegistrationHandle, DiscoverError> {
        if self.service.is_some() {
            // One live registration per backend instance.
            debug!(fullname = ?self.fullname, "Retiring previous delegated registration");
            self.teardown();
        }

        let service_type = ServiceType::new("http", "tcp")
            .map_err(|e| DiscoverError::ServiceRecord(e.to_string()))?;
        let mut service = MdnsService::new(service_type, descriptor.port);
        service.set_name(&descriptor.name);

        let mut txt_record = TxtRecord::new();
        for (key, value) in descriptor.txt_attributes() {
            txt_record
                .insert(key, value)
                .map_err(|e| DiscoverError::ServiceRecord(e.to_string()))?;
        }
        service.set_txt_record(txt_record);

        let (phase_tx, phase_rx) = watch::channel(RegistrationPhase::Pending);
        service.set_registered_callback(Box::new(move |result, _context| {
            on_service_registered(result, &phase_tx);
        }));

        debug!(
            name = %descriptor.name,
            port = descriptor.port,
            "Submitting registration to the OS discovery service"
        );

        let event_loop = service
            .register()
            .map_err(|e| DiscoverError::Registration(e.to_string()))?;

        // One kick so the daemon picks the request up; the outcome is
        // observed through the completion channel, not awaited here.
        event_loop
            .poll(Duration::from_millis(100))
            .map_err(|e| DiscoverError::Registration(e.to_string()))?;

        let fullname = descriptor.fullname();
        self.service = Some(service);
        self.event_loop = Some(event_loop);
        self.phase = Some(phase_rx);
        self.fullname = Some(fullname.clone());

        info!(
            fullname = %fullname,
            port = descriptor.port,
            "Registration submitted; completion arrives via callback"
        );
        Ok(RegistrationHandle::new(fullname))
    }

    fn unregister(&mut self, handle: RegistrationHandle) -> Result<(), DiscoverError> {
        if self.service.is_none() {
            debug!(fullname = %handle.fullname(), "No delegated registration to retract");
            return Ok(());
        }
        self.teardown();
        info!(
            fullname = %handle.fullname(),
            "Withdrew registration from the OS discovery service"
        );
        Ok(())
    }

    fn completion(&self) -> Option<watch::Receiver<RegistrationPhase>> {
        self.phase.clone()
    }

    fn poll(&self) -> Result<(), DiscoverError> {
        if let Some(event_loop) = &self.event_loop {
            event_loop
                .poll(Duration::from_millis(0))
                .map_err(|e| DiscoverError::Mdns(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for DelegatedBackend {
    fn drop(&mut self) {
        if self.service.is_some() {
            debug!(fullname = ?self.fullname, "Dropping live delegated registration");
            self.teardown();
        }
    }
}

fn on_service_registered(
    result: zeroconf::Result<ServiceRegistration>,
    phase: &watch::Sender<RegistrationPhase>,
) {
    match result {
        Ok(registration) => {
            info!(
                name = %registration.name(),
                domain = %registration.domain(),
                "OS discovery service confirmed the registration"
            );
            let _ = phase.send(RegistrationPhase::Registered {
                name: registration.name().clone(),
            });
        }
        Err(e) => {
            error!(error = %e, "OS discovery service rejected the registration");
            let _ = phase.send(RegistrationPhase::Failed {
                reason: e.to_string(),
            });
        }
    }
}
