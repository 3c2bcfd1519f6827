use std::path::PathBuf;

use serde::Deserialize;

/// The full monitor configuration as read from `config.yml`.
/// Every section is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub dns: DnsConfig,
    pub ping: PingConfig,
    pub storage: StorageConfig,
}

/// Resolvers and hostnames for the DNS cross product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Resolver endpoints, `ip` or `ip:port`. Port 53 is assumed when omitted.
    pub servers: Vec<String>,

    /// Hostnames resolved against every server.
    pub hostnames: Vec<String>,

    /// Deadline for a single lookup.
    pub timeout_ms: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["1.1.1.1".to_string()],
            hostnames: vec!["google.com".to_string()],
            timeout_ms: 2000,
        }
    }
}

/// The two ping targets and how each of them is probed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    /// Caller supplied host, pinged alongside the gateway.
    pub target: String,

    /// The local gateway.
    pub gateway: String,

    /// Echo requests sent per probe.
    pub count: u16,

    /// Pause between two echo requests.
    pub interval_ms: u64,

    /// How long to wait for a single echo reply.
    pub timeout_ms: u64,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            target: "1.1.1.1".to_string(),
            gateway: "192.168.0.1".to_string(),
            count: 3,
            interval_ms: 1000,
            timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dns_file: PathBuf,
    pub ping_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dns_file: PathBuf::from("data/dns_results.json"),
            ping_file: PathBuf::from("data/ping_results.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: MonitorConfig = serde_yaml::from_str("{}").expect("Invalid YAML");
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.dns.servers, vec!["1.1.1.1"]);
        assert_eq!(config.dns.hostnames, vec!["google.com"]);
        assert_eq!(config.ping.count, 3);
    }

    #[test]
    fn test_monitor_config_deserialization() {
        let yaml = r#"
                    dns:
                        servers: ["1.1.1.1", "8.8.8.8:53"]
                        hostnames:
                            - google.com
                            - github.com
                    ping:
                        target: 9.9.9.9
                        count: 5
                    storage:
                        ping_file: /var/lib/netmon/ping.json
                    "#;

        let config: MonitorConfig = serde_yaml::from_str(yaml).expect("Invalid YAML");
        assert_eq!(config.dns.servers, vec!["1.1.1.1", "8.8.8.8:53"]);
        assert_eq!(config.dns.hostnames, vec!["google.com", "github.com"]);
        assert_eq!(config.dns.timeout_ms, 2000);
        assert_eq!(config.ping.target, "9.9.9.9");
        assert_eq!(config.ping.gateway, "192.168.0.1");
        assert_eq!(config.ping.count, 5);
        assert_eq!(config.storage.ping_file, PathBuf::from("/var/lib/netmon/ping.json"));
        assert_eq!(config.storage.dns_file, PathBuf::from("data/dns_results.json"));
    }
}
