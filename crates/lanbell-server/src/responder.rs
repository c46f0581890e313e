//! Responder lifecycle: bind, serve, stop.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::ServerError;
use crate::notify::Notifier;
use crate::routes::create_router;

/// The embedded HTTP responder.
///
/// Binds `address:port` on `start` and serves every inbound connection on
/// the tokio runtime, decoupled from the caller, until `stop`. A responder
/// can be restarted after a stop; a second `start` while running is
/// rejected.
pub struct HttpResponder {
    notifier: Arc<dyn Notifier>,
    running: Option<RunningResponder>,
}

struct RunningResponder {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl HttpResponder {
    /// Create a stopped responder that surfaces messages through
    /// `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            running: None,
        }
    }

    /// Bind `address:port` and start serving.
    ///
    /// Returns the bound address; with port 0 it carries the
    /// kernel-assigned port.
    pub async fn start(
        &mut self,
        address: Ipv4Addr,
        port: u16,
    ) -> Result<SocketAddr, ServerError> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let addr = SocketAddr::from((address, port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let app = create_router(self.notifier.clone());
        let shutdown = CancellationToken::new();
        let signal = shutdown.clone().cancelled_owned();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
            {
                error!(error = %e, "Responder terminated with an error");
            }
        });

        info!(address = %local_addr, "Responder listening");
        self.running = Some(RunningResponder {
            local_addr,
            shutdown,
            task,
        });
        Ok(local_addr)
    }

    /// Stop serving. A no-op when the responder is not running.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.shutdown.cancel();
        if running.task.await.is_err() {
            error!("Responder task panicked during shutdown");
        }
        info!(address = %running.local_addr, "Responder stopped");
    }

    /// Whether the responder is currently serving.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }
}
