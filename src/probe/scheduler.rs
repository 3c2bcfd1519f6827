use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{ProbeError, Prober, error_chain};
use crate::results::{DnsProbeResult, PingProbeResult};
use crate::to_fixed_width;

const COLUMN_WIDTH: usize = 20;

/// Drives probe executions and collects the successful results into one batch.
///
/// Failed probes are logged and skipped; they never abort sibling probes.
pub struct ProbeScheduler {
    prober: Arc<dyn Prober>,
    cancel: CancellationToken,
}

impl ProbeScheduler {
    pub fn new(prober: Arc<dyn Prober>, cancel: CancellationToken) -> Self {
        Self { prober, cancel }
    }

    /// Resolve every hostname against every server, one pair at a time.
    /// Order is servers outer, hostnames inner.
    pub async fn run_dns(&self, servers: &[String], hostnames: &[String]) -> Vec<DnsProbeResult> {
        let mut batch = Vec::with_capacity(servers.len() * hostnames.len());

        for server in servers {
            for hostname in hostnames {
                let target = format!("{hostname} via {server}");
                match cancellable(&self.cancel, target, self.prober.resolve(hostname, server)).await {
                    Ok(result) => {
                        log::info!(
                            "✅ [DNS] {} {} {:?}",
                            to_fixed_width(server, COLUMN_WIDTH),
                            to_fixed_width(hostname, COLUMN_WIDTH),
                            result.response_time
                        );
                        batch.push(result);
                    }
                    Err(e) => log::warn!("❌ [DNS] {}", error_chain(&e)),
                }
            }
        }

        batch
    }

    /// Ping `target` and `gateway` concurrently and wait for both.
    ///
    /// Each unit sends its record over a channel; the channel is only drained
    /// after both units have been joined.
    pub async fn run_ping(&self, target: &str, gateway: &str) -> Vec<PingProbeResult> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(2);

        for host in [target, gateway] {
            let prober = Arc::clone(&self.prober);
            let cancel = self.cancel.clone();
            let tx = tx.clone();
            let host = host.to_string();

            handles.push(tokio::spawn(async move {
                match cancellable(&cancel, host.clone(), prober.ping(&host)).await {
                    Ok(result) => {
                        log::info!(
                            "✅ [ICMP] Pinged {} with an average response time of {:?}",
                            result.host,
                            result.response_time
                        );
                        let _ = tx.send(result);
                    }
                    Err(e) => log::warn!("❌ [ICMP] {}", error_chain(&e)),
                }
            }));
        }
        drop(tx);

        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("❌ [ICMP] Ping unit did not finish: {e}");
            }
        }

        let mut batch = Vec::with_capacity(2);
        while let Some(result) = rx.recv().await {
            batch.push(result);
        }
        batch
    }
}

/// Race a probe against the cancellation token.
/// Once cancelled, the probe yields [`ProbeError::Cancelled`] without being polled.
async fn cancellable<T, F>(cancel: &CancellationToken, target: String, probe: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProbeError::Cancelled { target }),
        result = probe => result,
    }
}
