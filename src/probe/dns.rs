use std::time::Instant;

use tokio::time::timeout;

use super::{ProbeError, ProbeSettings};
use crate::config::app_config::parse_resolver_endpoint;
use crate::config::setup_resolver;
use crate::results::DnsProbeResult;

/// Resolve `hostname` against the resolver at `server` and time the lookup.
///
/// A resolver is built per call so the query goes to `server` and nothing
/// else. The recorded server is the normalised `ip:port` endpoint.
pub async fn measure_dns_time(
    hostname: &str,
    server: &str,
    settings: &ProbeSettings,
) -> Result<DnsProbeResult, ProbeError> {
    let endpoint = parse_resolver_endpoint(server).map_err(|source| ProbeError::InvalidEndpoint {
        endpoint: server.to_string(),
        source,
    })?;

    if settings.verbose {
        log::info!("ℹ️ [DNS] Resolving '{hostname}' using '{endpoint}'");
    }

    // The resolver's own timeout sits past the deadline so a silent server
    // always ends up as `ProbeError::Timeout`.
    let resolver = setup_resolver(endpoint, settings.dns_timeout.saturating_mul(2));

    let start = Instant::now();
    let lookup = timeout(settings.dns_timeout, resolver.lookup_ip(hostname)).await;
    let elapsed = start.elapsed();

    match lookup {
        Ok(Ok(ips)) => {
            if settings.verbose {
                let addrs: Vec<_> = ips.iter().collect();
                log::info!("ℹ️ [DNS] Resolved '{hostname}' to {addrs:?}");
            }
            Ok(DnsProbeResult::new(endpoint.to_string(), hostname, elapsed))
        }
        Ok(Err(source)) => Err(ProbeError::Resolve {
            hostname: hostname.to_string(),
            server: endpoint.to_string(),
            source,
        }),
        Err(_) => Err(ProbeError::Timeout {
            target: format!("{hostname} via {endpoint}"),
            after: settings.dns_timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::test_settings;

    #[tokio::test]
    async fn test_invalid_server_is_typed_failure() {
        let err = measure_dns_time("google.com", "not-an-ip", &test_settings())
            .await
            .expect_err("invalid endpoint");

        match err {
            ProbeError::InvalidEndpoint { endpoint, .. } => assert_eq!(endpoint, "not-an-ip"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Bound but never answers.
        let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.expect("bind");
        let server = silent.local_addr().expect("local addr").to_string();

        let settings = test_settings();
        let err = measure_dns_time("google.com", &server, &settings)
            .await
            .expect_err("no answer");

        match err {
            ProbeError::Timeout { target, after } => {
                assert_eq!(target, format!("google.com via {server}"));
                assert_eq!(after, settings.dns_timeout);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
