//! HTTP server setup and the serve loop.
//!
//! # Responsibilities
//! - Build the Axum router (catch-all greeting handler + middleware)
//! - Accept connections from the bounded listener
//! - Serve each connection over HTTP/1.1 with a read-header timeout
//! - Stop on shutdown signal or on an unrecoverable handler error

use axum::{
    http::Request,
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower::Service;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ResponderConfig;
use crate::host::HostnameProvider;
use crate::http::handler::{greet_handler, AppState, BufferSinks, Greeter, SinkFactory};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::lifecycle::{fatal_channel, FatalReceiver, FatalReporter};
use crate::net::{Listener, ListenerError};

/// Errors that end the serve loop.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to start server: {0}")]
    Listen(#[from] ListenerError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a response body failed. The server cannot trust its output
    /// path any more and stops.
    #[error("unrecoverable: failed to write response body: {0}")]
    Unrecoverable(#[source] std::io::Error),
}

impl ServeError {
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, ServeError::Unrecoverable(_))
    }
}

/// HTTP server reporting its host identity.
pub struct HttpServer {
    router: Router,
    config: ResponderConfig,
    fatal: FatalReporter,
    fatal_rx: FatalReceiver,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and hostname source.
    pub fn new(config: ResponderConfig, hostnames: Arc<dyn HostnameProvider>) -> Self {
        Self::with_sinks(config, hostnames, Arc::new(BufferSinks))
    }

    /// Like [`HttpServer::new`], with a custom source of response body sinks.
    pub fn with_sinks(
        config: ResponderConfig,
        hostnames: Arc<dyn HostnameProvider>,
        sinks: Arc<dyn SinkFactory>,
    ) -> Self {
        let (fatal, fatal_rx) = fatal_channel();

        let state = AppState {
            greeter: Arc::new(Greeter::new(hostnames)),
            sinks,
            fatal: fatal.clone(),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            fatal,
            fatal_rx,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ResponderConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(greet_handler))
            .route("/", any(greet_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// Handle for reporting unrecoverable errors to this server's run loop.
    pub fn fatal_handle(&self) -> FatalReporter {
        self.fatal.clone()
    }

    /// Run the server until `shutdown` fires or a handler reports an
    /// unrecoverable error.
    ///
    /// A closed shutdown channel counts as a shutdown request.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let Self {
            router,
            config,
            fatal: _,
            mut fatal_rx,
        } = self;

        let graceful = GracefulShutdown::new();
        let read_header_timeout = Duration::from_secs(config.timeouts.read_header_secs);

        let outcome = loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(e @ ListenerError::Closed) => break Err(e.into()),
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };

                    let service = hyper::service::service_fn({
                        let router = router.clone();
                        move |request: Request<Incoming>| router.clone().call(request)
                    });

                    let conn = http1::Builder::new()
                        .timer(TokioTimer::new())
                        .header_read_timeout(read_header_timeout)
                        .serve_connection(TokioIo::new(stream), service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(e) = conn.await {
                            tracing::debug!(peer_addr = %peer, error = %e, "Connection closed with error");
                        }
                    });
                }
                Some(error) = fatal_rx.recv() => {
                    tracing::error!(error = %error, "Unrecoverable error, stopping server");
                    break Err(error);
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break Ok(());
                }
            }
        };

        drop(listener);

        let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
        if tokio::time::timeout(grace, graceful.shutdown()).await.is_err() {
            tracing::warn!(grace_secs = grace.as_secs(), "Connections still open after grace period");
        }

        tracing::info!("HTTP server stopped");
        outcome
    }
}
