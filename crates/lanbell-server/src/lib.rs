//! Embedded HTTP responder for lanbell.
//!
//! Serves the endpoint that the discovery layer advertises: a static landing
//! page on every path, plus `GET /log`, which forwards the `message` query
//! parameter to the injected [`Notifier`] and acknowledges in plain text.
//! Each request is handled independently; the responder holds no per-client
//! state.

mod error;
mod notify;
mod page;
mod responder;
mod routes;

pub use error::ServerError;
pub use notify::{LogNotifier, Notifier};
pub use page::LANDING_PAGE;
pub use responder::HttpResponder;
pub use routes::create_router;
