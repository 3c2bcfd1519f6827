pub mod identity;
pub mod record;

use std::time::Duration;

pub use identity::ServerIdentity;
pub use record::{DnsProbeResult, PingProbeResult};

/// Arithmetic mean of a set of durations, truncated to whole nanoseconds.
/// Returns `None` for an empty set.
pub fn mean_duration<I>(durations: I) -> Option<Duration>
where
    I: IntoIterator<Item = Duration>,
{
    let (total, count) = durations
        .into_iter()
        .fold((0u128, 0u128), |(total, count), d| (total + d.as_nanos(), count + 1));

    if count == 0 {
        return None;
    }
    let mean = u64::try_from(total / count).unwrap_or(u64::MAX);
    Some(Duration::from_nanos(mean))
}
