//! The scan loop.
//!
//! # State Machine
//! ```text
//! Start → Probing ─┬→ Complete   (distinct responses == expected)
//!          ↑   │   ├→ TimedOut   (run budget exceeded, checked between requests)
//!          └───┘   └→ Failed     (any transport error, no retry)
//! ```

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::config::ScanConfig;
use crate::scan::fingerprint::{Fingerprint, ObservedHosts};

/// Resolved settings for one scan run.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub target: Url,
    pub expected_hosts: usize,
    pub request_timeout: Duration,
    pub run_timeout: Duration,
    pub interval: Duration,
}

impl ScanSettings {
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        let target = Url::parse(&config.target_url).map_err(|source| ScanError::InvalidTarget {
            url: config.target_url.clone(),
            source,
        })?;

        Ok(Self {
            target,
            expected_hosts: config.expected_hosts,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            run_timeout: Duration::from_secs(config.run_timeout_secs),
            interval: Duration::from_millis(config.interval_ms),
        })
    }
}

/// Where the probe is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Start,
    Probing,
    Complete,
    TimedOut,
    Failed,
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Complete | ScanState::TimedOut | ScanState::Failed)
    }
}

/// Reasons a scan does not complete.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid target {url:?}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to do request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("timeout: exceeded to find all hosts (found {found} of {expected} after {elapsed:?})")]
    TimedOut {
        found: usize,
        expected: usize,
        elapsed: Duration,
    },

    #[error("failed to write progress: {0}")]
    Output(#[from] io::Error),
}

/// Result of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Distinct response bodies, in first-seen order.
    pub hosts: Vec<String>,
    /// Requests sent, including duplicates.
    pub requests: usize,
    pub elapsed: Duration,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tList responses:")?;
        for (i, body) in self.hosts.iter().enumerate() {
            writeln!(f, "\t  #{:02}: \"{}\"", i + 1, body.trim())?;
        }
        Ok(())
    }
}

/// Polls a target until enough distinct responses are seen.
pub struct ScanProbe {
    settings: ScanSettings,
    state: ScanState,
}

impl ScanProbe {
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            settings,
            state: ScanState::Start,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Run the scan, writing progress lines to `progress`.
    pub async fn run<W: Write + ?Sized>(&mut self, progress: &mut W) -> Result<ScanReport, ScanError> {
        let outcome = self.probe_loop(progress).await;
        self.state = match &outcome {
            Ok(_) => ScanState::Complete,
            Err(ScanError::TimedOut { .. }) => ScanState::TimedOut,
            Err(_) => ScanState::Failed,
        };
        outcome
    }

    async fn probe_loop<W: Write + ?Sized>(&mut self, progress: &mut W) -> Result<ScanReport, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(ScanError::Client)?;

        let expected = self.settings.expected_hosts;
        let mut observed = ObservedHosts::new();
        let mut requests = 0usize;

        writeln!(progress, "\tSearching for {expected} hosts.")?;
        tracing::info!(target_url = %self.settings.target, expected, "Scan started");

        let started = Instant::now();
        self.state = ScanState::Probing;

        loop {
            let body = self.fetch(&client).await?;
            requests += 1;

            if observed.record(&body) {
                tracing::debug!(
                    fingerprint = %Fingerprint::of(&body),
                    found = observed.len(),
                    "New host observed"
                );
            }

            let found = observed.len();
            write!(progress, "\tFound {found} hosts {}\r", ".".repeat(found))?;
            progress.flush()?;

            if found >= expected {
                writeln!(progress, "\n\tOK: found all hosts")?;
                return Ok(ScanReport {
                    hosts: observed.into_bodies(),
                    requests,
                    elapsed: started.elapsed(),
                });
            }

            let elapsed = started.elapsed();
            if elapsed > self.settings.run_timeout {
                writeln!(progress)?;
                return Err(ScanError::TimedOut {
                    found,
                    expected,
                    elapsed,
                });
            }

            if !self.settings.interval.is_zero() {
                tokio::time::sleep(self.settings.interval).await;
            }
        }
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<Vec<u8>, ScanError> {
        let response = client
            .get(self.settings.target.clone())
            .send()
            .await
            .map_err(ScanError::Transport)?;

        let body = response.bytes().await.map_err(ScanError::Body)?;
        Ok(body.to_vec())
    }
}
