//! `--ping` self-check.
//!
//! # Responsibilities
//! - Detect the `--ping` marker in the process arguments
//! - Send one bounded GET to the server's own advertised address
//! - Map the outcome to an exit code through the injected [`Exit`]
//!
//! Any response at all, whatever its status, means the server is up. The
//! listening socket is never opened in this mode.

use std::io::Write;
use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

/// Argument that switches the binary into self-check mode.
pub const PING_FLAG: &str = "--ping";

/// Exit code for a healthy check (and any successful run).
pub const EXIT_HEALTHY: i32 = 0;

/// Exit code for an unhealthy check (and any fatal error).
pub const EXIT_UNHEALTHY: i32 = 1;

/// Default bound for the self-check request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Process termination capability.
///
/// Production code terminates the process; tests record the code instead.
pub trait Exit {
    fn exit(&self, code: i32);
}

/// Terminates the process with `std::process::exit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Exit for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}

/// Reasons the self-check fails.
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error("parse {url:?}: invalid control character in URL")]
    ControlCharacter { url: String },

    #[error("parse {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build health check client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("health check request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Whether any argument carries the `--ping` marker.
pub fn ping_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter().any(|arg| arg.as_ref().contains(PING_FLAG))
}

/// Parse the self-check target, rejecting ASCII control bytes outright.
pub fn parse_target(raw: &str) -> Result<Url, PingError> {
    if raw.bytes().any(|b| b < b' ' || b == 0x7f) {
        return Err(PingError::ControlCharacter { url: raw.to_string() });
    }

    Url::parse(raw).map_err(|source| PingError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// One-shot health check against the server's own address.
pub struct SelfCheck<E: Exit = ProcessExit> {
    target: String,
    timeout: Duration,
    exit: E,
}

impl<E: Exit> SelfCheck<E> {
    pub fn new(target: impl Into<String>, timeout: Duration, exit: E) -> Self {
        Self {
            target: target.into(),
            timeout,
            exit,
        }
    }

    /// Send the GET. `Ok` carries whatever status the server answered with.
    pub async fn probe(&self) -> Result<StatusCode, PingError> {
        let url = parse_target(&self.target)?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .no_proxy()
            .build()
            .map_err(PingError::Client)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|source| PingError::Transport {
                url: self.target.clone(),
                source,
            })?;

        Ok(response.status())
    }

    /// Run the check if `args` contain the marker.
    ///
    /// Returns `None` without any output when the marker is absent. Otherwise
    /// the failure detail (if any) goes to `diagnostics`, the exit capability
    /// is invoked, and the code is returned for callers whose exit returns.
    pub async fn run_if_requested<I, S, W>(&self, args: I, diagnostics: &mut W) -> Option<i32>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        W: Write + ?Sized,
    {
        if !ping_requested(args) {
            return None;
        }

        let code = match self.probe().await {
            Ok(status) => {
                tracing::debug!(target_url = %self.target, status = %status, "Self-check succeeded");
                EXIT_HEALTHY
            }
            Err(e) => {
                let _ = writeln!(diagnostics, "{e}");
                EXIT_UNHEALTHY
            }
        };

        self.exit.exit(code);
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingExit(Arc<Mutex<Vec<i32>>>);

    impl Exit for RecordingExit {
        fn exit(&self, code: i32) {
            self.0.lock().unwrap().push(code);
        }
    }

    #[test]
    fn marker_detection() {
        assert!(ping_requested(["prog", "--ping"]));
        assert!(ping_requested(["prog", "--verbose", "--ping"]));
        assert!(!ping_requested(["prog", ""]));
        assert!(!ping_requested(["prog", "--pin", "ping"]));
        assert!(!ping_requested(Vec::<String>::new()));
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = parse_target("http://localhost:8080/\x7f").unwrap_err();
        assert!(err.to_string().contains("invalid control character in URL"));

        let err = parse_target("http://localhost:8080/\n").unwrap_err();
        assert!(matches!(err, PingError::ControlCharacter { .. }));

        assert!(parse_target("http://localhost:8080/").is_ok());
    }

    #[test]
    fn garbage_is_invalid_url() {
        let err = parse_target("not a url").unwrap_err();
        assert!(matches!(err, PingError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn without_marker_does_nothing() {
        let exit = RecordingExit::default();
        let check = SelfCheck::new("http://localhost:8080/", DEFAULT_TIMEOUT, exit.clone());
        let mut out = Vec::new();

        let code = check.run_if_requested(["prog", ""], &mut out).await;

        assert_eq!(code, None);
        assert!(out.is_empty(), "expected no output");
        assert!(exit.0.lock().unwrap().is_empty(), "exit must not be called");
    }

    #[tokio::test]
    async fn control_character_target_exits_unhealthy() {
        let exit = RecordingExit::default();
        let check = SelfCheck::new("http://localhost:8080/\x7f", DEFAULT_TIMEOUT, exit.clone());
        let mut out = Vec::new();

        let code = check.run_if_requested(["prog", "--ping"], &mut out).await;

        assert_eq!(code, Some(EXIT_UNHEALTHY));
        assert_eq!(*exit.0.lock().unwrap(), vec![EXIT_UNHEALTHY]);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("invalid control character in URL"), "got: {out}");
    }
}
