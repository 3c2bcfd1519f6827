//! Averages over the full persisted history.
//!
//! Both aggregates are pure and rescan every record on each call.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::results::{DnsProbeResult, PingProbeResult, ServerIdentity, mean_duration};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("no {kind} records to average")]
    EmptyInput { kind: &'static str },
}

/// Mean response time and the number of records behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub mean: Duration,
    pub samples: usize,
}

impl LatencySummary {
    fn from_durations(durations: &[Duration]) -> Option<Self> {
        mean_duration(durations.iter().copied()).map(|mean| Self {
            mean,
            samples: durations.len(),
        })
    }
}

/// Mean response time across every ping record.
pub fn ping_average(results: &[PingProbeResult]) -> Result<LatencySummary, AggregateError> {
    let durations: Vec<Duration> = results.iter().map(|r| r.response_time).collect();
    LatencySummary::from_durations(&durations).ok_or(AggregateError::EmptyInput { kind: "ping" })
}

/// Mean response time per server identity.
/// Only identities with at least one record appear in the output.
pub fn dns_average_by_server(results: &[DnsProbeResult]) -> BTreeMap<ServerIdentity, LatencySummary> {
    let mut groups: BTreeMap<ServerIdentity, Vec<Duration>> = BTreeMap::new();
    for result in results {
        groups
            .entry(result.server_identity())
            .or_default()
            .push(result.response_time);
    }

    groups
        .into_iter()
        .filter_map(|(identity, durations)| {
            LatencySummary::from_durations(&durations).map(|summary| (identity, summary))
        })
        .collect()
}
