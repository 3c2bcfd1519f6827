pub mod aggregate;

use std::collections::BTreeMap;

pub use aggregate::{AggregateError, LatencySummary, dns_average_by_server, ping_average};

use crate::results::ServerIdentity;
use crate::to_fixed_width;

const LABEL_WIDTH: usize = 12;

/// Render the ping summary line.
pub fn format_ping_summary(summary: &Result<LatencySummary, AggregateError>) -> String {
    match summary {
        Ok(s) => format!(
            "[i] Average Ping response time: {:?} ({} samples)",
            s.mean, s.samples
        ),
        Err(e) => format!("[i] No ping data: {e}"),
    }
}

/// Render one line per server label, ordered by label.
pub fn format_dns_summary(summary: &BTreeMap<ServerIdentity, LatencySummary>) -> Vec<String> {
    if summary.is_empty() {
        return vec!["[i] No DNS data".to_string()];
    }
    summary
        .iter()
        .map(|(identity, s)| {
            format!(
                "[i] Average DNS response time for {}: {:?} ({} samples)",
                to_fixed_width(identity.label(), LABEL_WIDTH),
                s.mean,
                s.samples
            )
        })
        .collect()
}
