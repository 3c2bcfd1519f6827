use std::net::IpAddr;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tokio::time::{sleep, timeout};

use super::{ProbeError, ProbeSettings};
use crate::results::{PingProbeResult, mean_duration};

const PAYLOAD: [u8; 56] = [0; 56];

/// Resolve hostname to IP address.
async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

/// Send `settings.ping_count` echo requests to `host` and report the mean
/// round trip time of the replies that came back.
///
/// The host lookup is bounded by the DNS timeout. The echoes are bounded by
/// [`ProbeSettings::ping_deadline`], which starts once the socket is open.
pub async fn ping_host(host: &str, settings: &ProbeSettings) -> Result<PingProbeResult, ProbeError> {
    if settings.verbose {
        log::info!("ℹ️ [ICMP] Pinging {host}");
    }

    let ip = match timeout(settings.dns_timeout, resolve_host(host)).await {
        Ok(resolved) => resolved.map_err(|source| ProbeError::HostLookup {
            host: host.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(ProbeError::Timeout {
                target: host.to_string(),
                after: settings.dns_timeout,
            });
        }
    };

    // Raw ICMP sockets need elevated privileges, this is where that shows.
    let client = match ip {
        IpAddr::V4(_) => Client::new(&Config::default()),
        IpAddr::V6(_) => Client::new(&Config::builder().kind(ICMP::V6).build()),
    }
    .map_err(|source| ProbeError::PingSetup {
        host: host.to_string(),
        source,
    })?;

    let deadline = settings.ping_deadline();
    match timeout(deadline, send_echoes(&client, ip, host, settings)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout {
            target: host.to_string(),
            after: deadline,
        }),
    }
}

async fn send_echoes(
    client: &Client,
    ip: IpAddr,
    host: &str,
    settings: &ProbeSettings,
) -> Result<PingProbeResult, ProbeError> {
    let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
    pinger.timeout(settings.ping_timeout);

    let mut rtts = Vec::with_capacity(usize::from(settings.ping_count));
    for seq in 0..settings.ping_count {
        if seq > 0 {
            sleep(settings.ping_interval).await;
        }
        match pinger.ping(PingSequence(seq), &PAYLOAD).await {
            Ok((_, rtt)) => rtts.push(rtt),
            Err(e) => log::debug!("[ICMP] echo {seq} to {host} failed: {e}"),
        }
    }

    let mean = mean_duration(rtts).ok_or_else(|| ProbeError::NoReply {
        host: host.to_string(),
        sent: settings.ping_count,
    })?;

    Ok(PingProbeResult::new(host, mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("127.0.0.1").await.expect("literal IPv4");
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.expect("literal IPv6");
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_typed_failure() {
        let err = ping_host("netmon.invalid", &crate::probe::test_settings())
            .await
            .expect_err("reserved TLD never resolves");

        match err {
            ProbeError::HostLookup { host, .. } | ProbeError::Timeout { target: host, .. } => {
                assert_eq!(host, "netmon.invalid")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
