//! imhost: a diagnostic HTTP responder that reports the host it runs on,
//! plus a scan probe that counts distinct hosts behind a load balancer.

pub mod config;
pub mod health;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod scan;

pub use config::{ResponderConfig, ScanConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
