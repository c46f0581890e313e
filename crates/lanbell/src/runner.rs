//! Beacon lifecycle orchestration.
//!
//! The start sequence is strictly sequential: resolve the address, bind the
//! responder, advertise. Stop reverses it: retract the advertisement, then
//! unbind. Any failure mid-start unwinds the pieces that already started
//! and parks the runner in `Failed` until the next explicit `start`.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use lanbell_discover::{
    DelegatedBackend, DiscoverError, DiscoveryBackend, EmbeddedBackend, RegistrationHandle,
    RegistrationPhase, ServiceDescriptor,
};
use lanbell_net::AddressSource;
use lanbell_server::{HttpResponder, Notifier, ServerError};

/// Which discovery backend advertises the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process mDNS responder.
    Embedded,
    /// OS discovery service (Avahi/Bonjour).
    Delegated,
}

/// Lifecycle states of the beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
    Stopping,
    /// A start attempt failed; stays until the next explicit `start`.
    Failed,
}

/// Errors that abort a start attempt.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("beacon is already running")]
    AlreadyRunning,

    #[error("no usable IPv4 address on the active wireless interface")]
    Resolution,

    #[error("start cancelled")]
    Cancelled,

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Discovery(#[from] DiscoverError),
}

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Advertised instance name.
    pub name: String,
    /// Port the responder binds; 0 lets the kernel pick.
    pub port: u16,
    /// Free-text description carried in the TXT record.
    pub description: String,
    /// Discovery backend to advertise with.
    pub backend: BackendKind,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name: "lanbell".to_string(),
            port: 8080,
            description: "lanbell HTTP endpoint".to_string(),
            backend: BackendKind::Embedded,
        }
    }
}

/// Orchestrates the beacon: address resolution, HTTP responder, discovery
/// registration.
pub struct Runner {
    config: RunnerConfig,
    state: LifecycleState,
    addresses: Arc<dyn AddressSource>,
    responder: HttpResponder,
    backend: Box<dyn DiscoveryBackend>,
    registration: Option<RegistrationHandle>,
    cancel: CancellationToken,
}

impl Runner {
    /// Create a runner with the backend named in `config`.
    pub fn new(
        config: RunnerConfig,
        addresses: Arc<dyn AddressSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let backend: Box<dyn DiscoveryBackend> = match config.backend {
            BackendKind::Embedded => Box::new(EmbeddedBackend::new()),
            BackendKind::Delegated => Box::new(DelegatedBackend::new()),
        };
        Self::with_backend(config, addresses, notifier, backend)
    }

    /// Create a runner around a caller-supplied backend.
    pub fn with_backend(
        config: RunnerConfig,
        addresses: Arc<dyn AddressSource>,
        notifier: Arc<dyn Notifier>,
        backend: Box<dyn DiscoveryBackend>,
    ) -> Self {
        Self {
            config,
            state: LifecycleState::Stopped,
            addresses,
            responder: HttpResponder::new(notifier),
            backend,
            registration: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Token that aborts an in-flight start at its next suspension point.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Bound responder address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.responder.local_addr()
    }

    /// Start the beacon: resolve, bind, advertise.
    ///
    /// Accepted from `Stopped` and `Failed`; any other state reports
    /// [`StartError::AlreadyRunning`] and leaves the current run untouched.
    pub async fn start(&mut self) -> Result<SocketAddr, StartError> {
        match self.state {
            LifecycleState::Stopped | LifecycleState::Failed => {}
            _ => return Err(StartError::AlreadyRunning),
        }
        self.state = LifecycleState::Starting;

        match self.try_start().await {
            Ok(addr) => {
                self.state = LifecycleState::Running;
                Ok(addr)
            }
            Err(e) => {
                self.state = LifecycleState::Failed;
                Err(e)
            }
        }
    }

    async fn try_start(&mut self) -> Result<SocketAddr, StartError> {
        // Resolved fresh on every attempt; the interface may have changed
        // since the last run.
        let source = Arc::clone(&self.addresses);
        let resolved = tokio::task::spawn_blocking(move || source.current_ipv4())
            .await
            .ok()
            .flatten();
        let Some(address) = resolved else {
            error!("No usable IPv4 address; beacon unavailable");
            return Err(StartError::Resolution);
        };
        info!(address = %address, "Resolved wireless address");

        if self.cancel.is_cancelled() {
            return Err(StartError::Cancelled);
        }

        let local_addr = self.responder.start(address, self.config.port).await?;

        if self.cancel.is_cancelled() {
            self.responder.stop().await;
            return Err(StartError::Cancelled);
        }

        // Advertise the port that was actually bound, not the configured
        // one; with port 0 they differ.
        let descriptor = ServiceDescriptor::new(&self.config.name, address, local_addr.port())
            .with_description(&self.config.description)
            .with_version(env!("CARGO_PKG_VERSION"));

        let handle = match self.backend.register(&descriptor) {
            Ok(handle) => handle,
            Err(e) => {
                self.responder.stop().await;
                return Err(e.into());
            }
        };
        self.registration = Some(handle);

        // Callback-based backends confirm later; log the outcome when it
        // lands without holding up the start.
        if let Some(phase) = self.backend.completion() {
            tokio::spawn(watch_registration(phase));
        }

        Ok(local_addr)
    }

    /// Stop the beacon: retract the advertisement, then stop the responder.
    ///
    /// Tolerates components that never started; calling `stop` on a stopped
    /// runner is a no-op.
    pub async fn stop(&mut self) {
        match self.state {
            LifecycleState::Running | LifecycleState::Failed => {}
            _ => return,
        }
        self.state = LifecycleState::Stopping;

        if let Some(handle) = self.registration.take() {
            if let Err(e) = self.backend.unregister(handle) {
                // Best-effort; never fatal.
                warn!(error = %e, "Unregistration failed");
            }
        }
        self.responder.stop().await;
        self.state = LifecycleState::Stopped;
        info!("Beacon stopped");
    }

    /// Keep a callback-based backend's event loop serviced. Call
    /// periodically while running.
    pub fn poll_discovery(&self) {
        if let Err(e) = self.backend.poll() {
            warn!(error = %e, "Discovery poll failed");
        }
    }
}

/// Log the eventual outcome of an asynchronous registration. The callback
/// may have fired before this task starts, so the current value is checked
/// before waiting.
async fn watch_registration(mut phase: tokio::sync::watch::Receiver<RegistrationPhase>) {
    loop {
        let current = phase.borrow_and_update().clone();
        match current {
            RegistrationPhase::Pending => {
                if phase.changed().await.is_err() {
                    // Backend went away without resolving.
                    return;
                }
            }
            RegistrationPhase::Registered { name } => {
                info!(name = %name, "Discovery service confirmed the registration");
                return;
            }
            RegistrationPhase::Failed { reason } => {
                error!(reason = %reason, "Discovery registration failed after start");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanbell_net::StaticAddressSource;
    use lanbell_server::LogNotifier;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    /// Address source that never resolves.
    struct NoAddressSource;

    impl AddressSource for NoAddressSource {
        fn current_ipv4(&self) -> Option<Ipv4Addr> {
            None
        }
    }

    /// Address source whose answer can change between starts.
    struct SwitchableSource(Mutex<Option<Ipv4Addr>>);

    impl AddressSource for SwitchableSource {
        fn current_ipv4(&self) -> Option<Ipv4Addr> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct ProbeState {
        registers: usize,
        unregisters: usize,
        fail_register: bool,
        last_descriptor: Option<ServiceDescriptor>,
    }

    /// Backend double that records calls instead of touching the network.
    #[derive(Default, Clone)]
    struct BackendProbe(Arc<Mutex<ProbeState>>);

    impl BackendProbe {
        fn failing() -> Self {
            let probe = Self::default();
            probe.0.lock().unwrap().fail_register = true;
            probe
        }

        fn registers(&self) -> usize {
            self.0.lock().unwrap().registers
        }

        fn unregisters(&self) -> usize {
            self.0.lock().unwrap().unregisters
        }

        fn last_descriptor(&self) -> Option<ServiceDescriptor> {
            self.0.lock().unwrap().last_descriptor.clone()
        }
    }

    struct FakeBackend {
        probe: BackendProbe,
    }

    impl DiscoveryBackend for FakeBackend {
        fn register(
            &mut self,
            descriptor: &ServiceDescriptor,
        ) -> Result<RegistrationHandle, DiscoverError> {
            let mut state = self.probe.0.lock().unwrap();
            if state.fail_register {
                return Err(DiscoverError::Registration("probe says no".to_string()));
            }
            state.registers += 1;
            state.last_descriptor = Some(descriptor.clone());
            Ok(RegistrationHandle::new(descriptor.fullname()))
        }

        fn unregister(&mut self, _handle: RegistrationHandle) -> Result<(), DiscoverError> {
            self.probe.0.lock().unwrap().unregisters += 1;
            Ok(())
        }
    }

    fn test_runner(addresses: Arc<dyn AddressSource>, probe: BackendProbe) -> Runner {
        let config = RunnerConfig {
            port: 0,
            ..RunnerConfig::default()
        };
        Runner::with_backend(
            config,
            addresses,
            Arc::new(LogNotifier::new()),
            Box::new(FakeBackend { probe }),
        )
    }

    fn localhost() -> Arc<dyn AddressSource> {
        Arc::new(StaticAddressSource::new(Ipv4Addr::LOCALHOST))
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let probe = BackendProbe::default();
        let mut runner = test_runner(localhost(), probe.clone());

        runner.stop().await;

        assert_eq!(runner.state(), LifecycleState::Stopped);
        assert_eq!(probe.unregisters(), 0);
    }

    #[tokio::test]
    async fn test_start_then_stop_round_trip() {
        let probe = BackendProbe::default();
        let mut runner = test_runner(localhost(), probe.clone());

        let addr = runner.start().await.unwrap();
        assert_eq!(runner.state(), LifecycleState::Running);
        assert_eq!(runner.local_addr(), Some(addr));
        assert_eq!(probe.registers(), 1);

        // The advertised port is the bound one, not the configured 0.
        let descriptor = probe.last_descriptor().unwrap();
        assert_eq!(descriptor.port, addr.port());
        assert_eq!(descriptor.address, Ipv4Addr::LOCALHOST);

        runner.stop().await;
        assert_eq!(runner.state(), LifecycleState::Stopped);
        assert_eq!(probe.unregisters(), 1);
        assert_eq!(runner.local_addr(), None);
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let probe = BackendProbe::default();
        let mut runner = test_runner(localhost(), probe.clone());

        runner.start().await.unwrap();
        let second = runner.start().await;

        assert!(matches!(second, Err(StartError::AlreadyRunning)));
        // The first registration stays live and untouched.
        assert_eq!(runner.state(), LifecycleState::Running);
        assert_eq!(probe.registers(), 1);
        assert_eq!(probe.unregisters(), 0);

        runner.stop().await;
    }

    #[tokio::test]
    async fn test_no_address_fails_without_side_effects() {
        let probe = BackendProbe::default();
        let mut runner = test_runner(Arc::new(NoAddressSource), probe.clone());

        let result = runner.start().await;

        assert!(matches!(result, Err(StartError::Resolution)));
        assert_eq!(runner.state(), LifecycleState::Failed);
        assert_eq!(runner.local_addr(), None);
        assert_eq!(probe.registers(), 0);
    }

    #[tokio::test]
    async fn test_registration_failure_unwinds_responder() {
        let probe = BackendProbe::failing();
        let mut runner = test_runner(localhost(), probe.clone());

        let result = runner.start().await;

        assert!(matches!(result, Err(StartError::Discovery(_))));
        assert_eq!(runner.state(), LifecycleState::Failed);
        assert_eq!(runner.local_addr(), None);
        assert_eq!(probe.unregisters(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_fails_without_registering() {
        let taken = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let port = taken.local_addr().unwrap().port();

        let probe = BackendProbe::default();
        let config = RunnerConfig {
            port,
            ..RunnerConfig::default()
        };
        let mut runner = Runner::with_backend(
            config,
            localhost(),
            Arc::new(LogNotifier::new()),
            Box::new(FakeBackend {
                probe: probe.clone(),
            }),
        );

        let result = runner.start().await;

        assert!(matches!(
            result,
            Err(StartError::Server(ServerError::Bind { .. }))
        ));
        assert_eq!(runner.state(), LifecycleState::Failed);
        assert_eq!(probe.registers(), 0);
    }

    #[tokio::test]
    async fn test_start_is_accepted_after_failure() {
        let source = Arc::new(SwitchableSource(Mutex::new(None)));
        let probe = BackendProbe::default();
        let mut runner = test_runner(source.clone(), probe.clone());

        assert!(runner.start().await.is_err());
        assert_eq!(runner.state(), LifecycleState::Failed);

        // The interface came up; retry straight from Failed.
        *source.0.lock().unwrap() = Some(Ipv4Addr::LOCALHOST);
        runner.start().await.unwrap();
        assert_eq!(runner.state(), LifecycleState::Running);
        assert_eq!(probe.registers(), 1);

        runner.stop().await;
    }

    #[tokio::test]
    async fn test_cancelled_start_unwinds_to_failed() {
        let probe = BackendProbe::default();
        let mut runner = test_runner(localhost(), probe.clone());

        runner.cancellation_token().cancel();
        let result = runner.start().await;

        assert!(matches!(result, Err(StartError::Cancelled)));
        assert_eq!(runner.state(), LifecycleState::Failed);
        assert_eq!(runner.local_addr(), None);
        assert_eq!(probe.registers(), 0);
    }

    #[tokio::test]
    async fn test_stop_from_failed_cleans_up() {
        let probe = BackendProbe::failing();
        let mut runner = test_runner(localhost(), probe.clone());

        assert!(runner.start().await.is_err());
        runner.stop().await;

        assert_eq!(runner.state(), LifecycleState::Stopped);
        // Registration never succeeded, so nothing to unregister.
        assert_eq!(probe.unregisters(), 0);
    }
}
