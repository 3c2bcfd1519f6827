use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::ServerIdentity;

/// One successful resolution of `hostname` against the resolver at `server`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DnsProbeResult {
    pub server: String,
    pub hostname: String,
    #[serde(with = "duration_nanos")]
    pub response_time: Duration,
    pub timestamp: DateTime<Utc>,
}

impl DnsProbeResult {
    pub fn new(server: impl Into<String>, hostname: impl Into<String>, response_time: Duration) -> Self {
        Self {
            server: server.into(),
            hostname: hostname.into(),
            response_time,
            timestamp: Utc::now(),
        }
    }

    pub fn server_identity(&self) -> ServerIdentity {
        ServerIdentity::from_endpoint(&self.server)
    }
}

/// Mean round trip time over the echoes answered by `host`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PingProbeResult {
    pub host: String,
    #[serde(with = "duration_nanos")]
    pub response_time: Duration,
    pub timestamp: DateTime<Utc>,
}

impl PingProbeResult {
    pub fn new(host: impl Into<String>, response_time: Duration) -> Self {
        Self {
            host: host.into(),
            response_time,
            timestamp: Utc::now(),
        }
    }
}

/// Durations travel as an integer count of nanoseconds.
mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
