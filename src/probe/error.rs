use std::net::AddrParseError;
use std::time::Duration;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Failure of one probe against one target.
/// Probe failures are local: the scheduler logs them and moves on.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid endpoint '{endpoint}'")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to resolve '{hostname}' using '{server}'")]
    Resolve {
        hostname: String,
        server: String,
        #[source]
        source: ResolveError,
    },

    #[error("failed to look up ping target '{host}'")]
    HostLookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open ICMP socket for '{host}'")]
    PingSetup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no echo replies from '{host}' ({sent} sent)")]
    NoReply { host: String, sent: u16 },

    #[error("'{target}' did not complete within {after:?}")]
    Timeout { target: String, after: Duration },

    #[error("probe of '{target}' was cancelled")]
    Cancelled { target: String },
}
