pub mod dns;
pub mod error;
pub mod ping;
pub mod scheduler;

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;

use crate::results::{DnsProbeResult, PingProbeResult};

pub use error::ProbeError;
pub use scheduler::ProbeScheduler;

/// Timeouts, counts and verbosity shared by all probe executors.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub dns_timeout: Duration,
    pub ping_count: u16,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub verbose: bool,
}

impl ProbeSettings {
    /// Upper bound for the echo phase of a ping probe.
    ///
    /// Every echo gets its interval and timeout, plus one extra timeout of
    /// headroom for the last reply. Saturates at `Duration::MAX`.
    pub fn ping_deadline(&self) -> Duration {
        self.ping_interval
            .checked_add(self.ping_timeout)
            .and_then(|per_echo| per_echo.checked_mul(u32::from(self.ping_count.max(1))))
            .and_then(|echoes| echoes.checked_add(self.ping_timeout))
            .unwrap_or(Duration::MAX)
    }
}

/// A single measurement of one target.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Resolve `hostname` against the resolver at `server`.
    async fn resolve(&self, hostname: &str, server: &str) -> Result<DnsProbeResult, ProbeError>;

    /// Ping `host` and report the mean round trip time.
    async fn ping(&self, host: &str) -> Result<PingProbeResult, ProbeError>;
}

/// Probes real resolvers and hosts over the network.
#[derive(Debug, Clone)]
pub struct NetworkProber {
    settings: ProbeSettings,
}

impl NetworkProber {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn resolve(&self, hostname: &str, server: &str) -> Result<DnsProbeResult, ProbeError> {
        dns::measure_dns_time(hostname, server, &self.settings).await
    }

    async fn ping(&self, host: &str) -> Result<PingProbeResult, ProbeError> {
        ping::ping_host(host, &self.settings).await
    }
}

/// Render an error together with its chain of sources.
pub fn error_chain(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
pub(crate) fn test_settings() -> ProbeSettings {
    ProbeSettings {
        dns_timeout: Duration::from_millis(200),
        ping_count: 3,
        ping_interval: Duration::from_millis(10),
        ping_timeout: Duration::from_millis(100),
        verbose: false,
    }
}
