//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use imhost::config::ResponderConfig;
use imhost::host::HostnameProvider;
use imhost::http::{BufferSinks, HttpServer, ServeError, SinkFactory};
use imhost::lifecycle::{FatalReporter, Shutdown};
use imhost::net::Listener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running responder on an ephemeral port.
pub struct RunningResponder {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub fatal: FatalReporter,
    pub handle: JoinHandle<Result<(), ServeError>>,
}

impl RunningResponder {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start the responder on 127.0.0.1 with the given hostname source.
pub async fn start_responder(hostnames: Arc<dyn HostnameProvider>) -> RunningResponder {
    start_responder_with_sinks(hostnames, Arc::new(BufferSinks)).await
}

/// Start the responder with a custom response body sink source.
pub async fn start_responder_with_sinks(
    hostnames: Arc<dyn HostnameProvider>,
    sinks: Arc<dyn SinkFactory>,
) -> RunningResponder {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();

    let mut config = ResponderConfig::default();
    config.listener.bind_address = addr.to_string();
    config.timeouts.shutdown_grace_secs = 1;

    let listener = Listener::new(tcp, config.listener.max_connections);
    let server = HttpServer::with_sinks(config, hostnames, sinks);
    let fatal = server.fatal_handle();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, server_shutdown));

    RunningResponder {
        addr,
        shutdown,
        fatal,
        handle,
    }
}

/// Start a backend that answers every connection with the next body in
/// `bodies`, cycling. Returns its address.
pub async fn start_rotating_backend(bodies: Vec<&'static str>) -> SocketAddr {
    let counter = Arc::new(AtomicUsize::new(0));
    let bodies = Arc::new(bodies);
    start_programmable_backend(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        (200, bodies[n % bodies.len()].to_string())
    })
    .await
}

/// Start a backend whose status and body are produced per connection.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn() -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let (status, body) = f();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
