//! The catch-all greeting handler.
//!
//! Every method on every path gets the same answer: the name of the host
//! serving the request. A hostname lookup failure is answered with a 500;
//! only a failure to write the body itself is treated as fatal.

use std::io::Write;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::host::HostnameProvider;
use crate::http::ServeError;
use crate::lifecycle::FatalReporter;

/// Body returned when the hostname resolves.
pub fn greeting(hostname: &str) -> String {
    format!("Hello from host: {hostname}\n")
}

/// Body returned when the hostname lookup fails.
pub fn hostname_failure(error: &std::io::Error) -> String {
    format!("failed to get hostname. error: {error}")
}

/// Renders the greeting for the current host.
pub struct Greeter {
    hostnames: Arc<dyn HostnameProvider>,
}

impl Greeter {
    pub fn new(hostnames: Arc<dyn HostnameProvider>) -> Self {
        Self { hostnames }
    }

    /// Resolve the hostname (fresh on every call) and write the body to `sink`.
    ///
    /// Returns the status the body should be sent with. A failing sink yields
    /// [`ServeError::Unrecoverable`].
    pub fn respond<W: Write + ?Sized>(&self, sink: &mut W) -> Result<StatusCode, ServeError> {
        let (status, body) = match self.hostnames.hostname() {
            Ok(name) => (StatusCode::OK, greeting(&name)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve hostname");
                (StatusCode::INTERNAL_SERVER_ERROR, hostname_failure(&e))
            }
        };

        sink.write_all(body.as_bytes())
            .map_err(ServeError::Unrecoverable)?;

        Ok(status)
    }
}

/// Buffer a response body is rendered into before it is sent.
pub trait BodySink: Write + Send {
    /// Hand over the rendered bytes.
    fn into_bytes(self: Box<Self>) -> Vec<u8>;
}

impl BodySink for Vec<u8> {
    fn into_bytes(self: Box<Self>) -> Vec<u8> {
        *self
    }
}

/// Opens one [`BodySink`] per request.
pub trait SinkFactory: Send + Sync + 'static {
    fn open(&self) -> Box<dyn BodySink>;
}

/// In-memory bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferSinks;

impl SinkFactory for BufferSinks {
    fn open(&self) -> Box<dyn BodySink> {
        Box::new(Vec::new())
    }
}

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub greeter: Arc<Greeter>,
    pub sinks: Arc<dyn SinkFactory>,
    pub fatal: FatalReporter,
}

/// Answer any request with the host greeting.
///
/// A sink failure answers 500 and reports the error to the server's run
/// loop, which then stops.
pub async fn greet_handler(State(state): State<AppState>) -> Response {
    let mut sink = state.sinks.open();

    match state.greeter.respond(&mut *sink) {
        Ok(status) => (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            sink.into_bytes(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to write response body");
            state.fatal.report(e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
