use std::env;
use std::io::ErrorKind;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
};

use super::error::ConfigError;
use super::model::MonitorConfig;
use crate::probe::ProbeSettings;

const DEFAULT_CONFIG_FILE: &str = "config.yml";
const DNS_PORT: u16 = 53;

/// Load the monitor configuration from the YAML file named by `CONFIG_FILE`
/// and apply environment overrides on top of it.
/// A missing file is not an error, the defaults are used instead.
pub fn load_config() -> Result<MonitorConfig, ConfigError> {
    let config_file_location =
        env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let mut config = load_config_from(Path::new(&config_file_location))?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate(&config)?;

    log::info!("Using DNS servers: {:?}", config.dns.servers);
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let config_str = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(MonitorConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if config_str.trim().is_empty() {
        return Ok(MonitorConfig::default());
    }

    serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Override configuration values from the environment.
/// `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut MonitorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(servers) = lookup("DNS_HOSTS") {
        config.dns.servers = split_list(&servers);
    }
    if let Some(hostnames) = lookup("DNS_HOSTNAMES") {
        config.dns.hostnames = split_list(&hostnames);
    }
    if let Some(target) = lookup("PING_TARGET") {
        config.ping.target = target.trim().to_string();
    }
    if let Some(gateway) = lookup("PING_GATEWAY") {
        config.ping.gateway = gateway.trim().to_string();
    }
    if let Some(path) = lookup("DNS_RESULTS_FILE") {
        config.storage.dns_file = PathBuf::from(path);
    }
    if let Some(path) = lookup("PING_RESULTS_FILE") {
        config.storage.ping_file = PathBuf::from(path);
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate(config: &MonitorConfig) -> Result<(), ConfigError> {
    if config.ping.count == 0 {
        return Err(ConfigError::Invalid("ping.count must be at least 1".into()));
    }
    if config.ping.timeout_ms == 0 {
        return Err(ConfigError::Invalid("ping.timeout_ms must be at least 1".into()));
    }
    if config.dns.timeout_ms == 0 {
        return Err(ConfigError::Invalid("dns.timeout_ms must be at least 1".into()));
    }
    Ok(())
}

impl MonitorConfig {
    /// Timeouts and counts handed to the probe executors.
    pub fn probe_settings(&self, verbose: bool) -> ProbeSettings {
        ProbeSettings {
            dns_timeout: Duration::from_millis(self.dns.timeout_ms),
            ping_count: self.ping.count,
            ping_interval: Duration::from_millis(self.ping.interval_ms),
            ping_timeout: Duration::from_millis(self.ping.timeout_ms),
            verbose,
        }
    }
}

/// Parse a resolver endpoint given as `ip` or `ip:port`.
pub fn parse_resolver_endpoint(endpoint: &str) -> Result<SocketAddr, AddrParseError> {
    let endpoint = endpoint.trim();
    match endpoint.parse::<SocketAddr>() {
        Ok(addr) => Ok(addr),
        Err(e) => match endpoint.parse::<IpAddr>() {
            Ok(ip) => Ok(SocketAddr::new(ip, DNS_PORT)),
            Err(_) => Err(e),
        },
    }
}

/// Setup a DNS resolver that only talks to `endpoint`.
/// Caching is disabled and a single attempt is made, so every lookup is a
/// real round trip bounded by `timeout`.
pub fn setup_resolver(endpoint: SocketAddr, timeout: Duration) -> TokioAsyncResolver {
    let mut opts = ResolverOpts::default();
    opts.attempts = 1;
    opts.timeout = timeout;
    opts.cache_size = 0;

    let mut name_servers = NameServerConfigGroup::new();
    name_servers.push(NameServerConfig {
        socket_addr: endpoint,
        protocol: Protocol::Udp,
        tls_dns_name: None,
        trust_negative_responses: false,
        bind_addr: None,
    });

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    TokioAsyncResolver::tokio(resolver_config, opts)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("1.1.1.1, 8.8.8.8 ,,"), vec!["1.1.1.1", "8.8.8.8"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DNS_HOSTS", "8.8.8.8,1.1.1.1:53"),
            ("DNS_HOSTNAMES", "example.com"),
            ("PING_GATEWAY", " 10.0.0.1 "),
            ("PING_RESULTS_FILE", "/tmp/ping.json"),
        ]);

        let mut config = MonitorConfig::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.dns.servers, vec!["8.8.8.8", "1.1.1.1:53"]);
        assert_eq!(config.dns.hostnames, vec!["example.com"]);
        assert_eq!(config.ping.gateway, "10.0.0.1");
        assert_eq!(config.ping.target, "1.1.1.1");
        assert_eq!(config.storage.ping_file, PathBuf::from("/tmp/ping.json"));
        assert_eq!(config.storage.dns_file, PathBuf::from("data/dns_results.json"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("absent.yml")).expect("defaults");
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "dns: [not, a, mapping").expect("write");

        let err = load_config_from(file.path()).expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let mut config = MonitorConfig::default();
        config.ping.count = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
        assert!(validate(&MonitorConfig::default()).is_ok());
    }

    #[test]
    fn test_parse_resolver_endpoint() {
        assert_eq!(
            parse_resolver_endpoint("1.1.1.1").expect("ip"),
            "1.1.1.1:53".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            parse_resolver_endpoint("9.9.9.9:5353").expect("ip:port"),
            "9.9.9.9:5353".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(parse_resolver_endpoint("::1").expect("v6").to_string(), "[::1]:53");
        assert!(parse_resolver_endpoint("dns.google").is_err());
    }

    #[test]
    fn test_probe_settings() {
        let settings = MonitorConfig::default().probe_settings(true);
        assert_eq!(settings.ping_count, 3);
        assert_eq!(settings.dns_timeout, Duration::from_secs(2));
        assert!(settings.verbose);
    }
}
