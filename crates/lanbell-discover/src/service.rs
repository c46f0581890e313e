//! Service descriptor and registration types.

use std::net::Ipv4Addr;

/// The DNS-SD service type under which beacons are advertised.
pub const SERVICE_TYPE: &str = "_http._tcp";

/// One advertised endpoint: instance name, address, port, and the TXT
/// attributes attached to the record.
///
/// A descriptor is built fresh for every registration attempt so that an
/// interface change between starts is picked up rather than papered over by
/// a cached address.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Instance name shown to browsers on the network.
    pub name: String,
    /// IPv4 address the endpoint is reachable at.
    pub address: Ipv4Addr,
    /// Port the endpoint listens on.
    pub port: u16,
    /// Free-text description carried in the TXT record.
    pub description: Option<String>,
    /// Software version carried in the TXT record.
    pub version: Option<String>,
}

impl ServiceDescriptor {
    /// Create a descriptor with the required fields.
    pub fn new(name: impl Into<String>, address: Ipv4Addr, port: u16) -> Self {
        Self {
            name: name.into(),
            address,
            port,
            description: None,
            version: None,
        }
    }

    /// Set the free-text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the advertised software version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The full DNS-SD service name this descriptor registers under.
    pub fn fullname(&self) -> String {
        format!("{}.{SERVICE_TYPE}.local.", self.name)
    }

    /// TXT attributes as key/value pairs.
    pub(crate) fn txt_attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attributes = Vec::new();
        if let Some(ref description) = self.description {
            attributes.push(("description", description.as_str()));
        }
        if let Some(ref version) = self.version {
            attributes.push(("version", version.as_str()));
        }
        attributes
    }
}

/// Opaque token for one live advertisement, required to retract it.
///
/// At most one handle is live per backend instance; registering again
/// retires the previous advertisement before a new handle is issued.
#[derive(Debug)]
pub struct RegistrationHandle {
    fullname: String,
}

impl RegistrationHandle {
    /// Create a handle for `fullname`. Backends mint exactly one per live
    /// registration.
    pub fn new(fullname: String) -> Self {
        Self { fullname }
    }

    /// The full DNS-SD service name, e.g. `lanbell._http._tcp.local.`.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }
}

impl std::fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fullname)
    }
}

/// Completion state of a registration submitted to a callback-based backend.
///
/// Delegated registrations are in flight after `register` returns; the
/// terminal state arrives through the backend's completion channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationPhase {
    /// Submitted, no confirmation yet.
    Pending,
    /// The discovery service confirmed the advertisement under `name`.
    Registered {
        /// Confirmed instance name. Host and address details on this path
        /// are best-effort and may be normalized or omitted by the daemon.
        name: String,
    },
    /// The discovery service rejected the advertisement.
    Failed {
        /// Backend-specific failure description.
        reason: String,
    },
}
