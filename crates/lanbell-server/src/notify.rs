//! Notification display seam.

use tracing::info;

/// Where received messages are surfaced on the host.
///
/// Called from the responder's request handlers, so implementations must be
/// cheap and must swallow their own failures; a broken display never affects
/// the HTTP response.
pub trait Notifier: Send + Sync {
    /// Show `message` to the local user.
    fn display(&self, message: &str);
}

/// Surfaces messages in the process log.
///
/// The default display on hosts without a desktop notification service.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn display(&self, message: &str) {
        info!(message = %message, "Received message");
    }
}
