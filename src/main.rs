//! imhost responder
//!
//! Answers every HTTP request with the name of the host serving it.
//!
//! ```text
//!     Client ──▶ net::Listener ──▶ hyper (HTTP/1.1) ──▶ axum router ──▶ greeting
//!                (max conns)       (read-header          (request id,     "Hello from host: <name>"
//!                                   timeout)              trace, timeout)
//! ```
//!
//! With `--ping` anywhere in the arguments the binary becomes a one-shot
//! health check against its own bind address and exits 0 (reachable) or
//! 1 (not reachable) without ever listening.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use imhost::config::{self, ConfigError, ResponderConfig};
use imhost::health::{ping_requested, ProcessExit, SelfCheck, EXIT_UNHEALTHY};
use imhost::host::SystemHostname;
use imhost::http::{HttpServer, ServeError};
use imhost::lifecycle::{signals, Shutdown};
use imhost::net::Listener;
use imhost::observability::logging;

#[derive(Parser)]
#[command(name = "imhost")]
#[command(about = "HTTP responder that reports the host it runs on", long_about = None)]
struct Cli {
    /// Check that the server is reachable at its own address, then exit
    #[arg(long)]
    ping: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration (e.g. 0.0.0.0:80)
    #[arg(short, long)]
    listen: Option<String>,
}

/// Options that take a value. Kept when the rest of the line is unparsable.
const VALUE_OPTIONS: [&str; 4] = ["--config", "-c", "--listen", "-l"];

/// Keep the program name and the value options (with their values), drop
/// everything else.
fn known_options(args: &[OsString]) -> Vec<OsString> {
    let mut kept = Vec::new();
    let mut iter = args.iter();
    if let Some(program) = iter.next() {
        kept.push(program.clone());
    }

    while let Some(arg) = iter.next() {
        let text = arg.to_string_lossy();
        if VALUE_OPTIONS.contains(&text.as_ref()) {
            kept.push(arg.clone());
            if let Some(value) = iter.next() {
                kept.push(value.clone());
            }
        } else if VALUE_OPTIONS
            .iter()
            .any(|option| option.starts_with("--") && text.starts_with(&format!("{option}=")))
        {
            kept.push(arg.clone());
        }
    }
    kept
}

/// Parse the command line. With `--ping` anywhere in it, arguments clap
/// does not understand are ignored so the self-check still runs.
fn parse_cli(args: &[OsString], ping: bool) -> Result<Cli, clap::Error> {
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(_) if ping => Cli::try_parse_from(known_options(args)),
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args_os: Vec<OsString> = std::env::args_os().collect();
    let args: Vec<String> = args_os
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let cli = match parse_cli(&args_os, ping_requested(&args)) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_UNHEALTHY as u8)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(EXIT_UNHEALTHY as u8)
        }
    }
}

async fn run(cli: Cli, args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => config::load_responder_config(path)?,
        None => ResponderConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    config::validation::validate_responder(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    let url = config.advertised_url();
    tracing::debug!(ping = cli.ping, target_url = %url, "Arguments parsed");

    // Returns only when --ping is absent.
    let check = SelfCheck::new(
        url.clone(),
        Duration::from_secs(config.timeouts.request_secs),
        ProcessExit,
    );
    check
        .run_if_requested(&args, &mut std::io::stderr())
        .await;

    println!("* Starting up server ...");
    println!("* Listening to: {url}");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        read_header_timeout_secs = config.timeouts.read_header_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener)
        .await
        .map_err(ServeError::Listen)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, Arc::new(SystemHostname));
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
