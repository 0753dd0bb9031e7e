//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper HTTP/1.1, read-header timeout)
//!     → request.rs (assign x-request-id, open request span)
//!     → handler.rs (resolve hostname, render greeting)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod server;

pub use handler::{greeting, hostname_failure, BodySink, BufferSinks, Greeter, SinkFactory};
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServeError};
