//! mDNS/DNS-SD service advertisement for lanbell.
//!
//! This crate announces a local HTTP endpoint on the surrounding network so
//! that other devices can find it without knowing its IP address. Beacons
//! are advertised under the service type `_http._tcp` in the local scope.
//!
//! Two interchangeable backends implement the same [`DiscoveryBackend`]
//! capability:
//!
//! - [`EmbeddedBackend`] runs its own mDNS responder in-process and answers
//!   discovery queries itself. Registration completes (or fails) inside the
//!   `register` call.
//! - [`DelegatedBackend`] hands the advertisement to the OS discovery daemon
//!   (Avahi on Linux, Bonjour on macOS). `register` returns once the request
//!   is submitted; confirmation or rejection arrives later through the
//!   backend's completion channel.
//!
//! Only one backend is active per running instance, and each backend keeps
//! at most one advertisement live at a time.
//!
//! # Example
//!
//! ```no_run
//! use std::net::Ipv4Addr;
//! use lanbell_discover::{DiscoveryBackend, EmbeddedBackend, ServiceDescriptor};
//!
//! let descriptor = ServiceDescriptor::new("lanbell", Ipv4Addr::new(192, 168, 1, 5), 8080)
//!     .with_description("lanbell HTTP endpoint");
//!
//! let mut backend = EmbeddedBackend::new();
//! let handle = backend.register(&descriptor).expect("registration failed");
//!
//! // ... serve traffic ...
//!
//! backend.unregister(handle).expect("unregistration failed");
//! ```

mod backend;
mod delegated;
mod embedded;
mod error;
mod lock;
mod service;

pub use backend::DiscoveryBackend;
pub use delegated::DelegatedBackend;
pub use embedded::EmbeddedBackend;
pub use error::DiscoverError;
pub use lock::{MulticastGuard, MulticastLock, NoopMulticastLock};
pub use service::{RegistrationHandle, RegistrationPhase, ServiceDescriptor, SERVICE_TYPE};
