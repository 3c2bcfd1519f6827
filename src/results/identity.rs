use std::fmt;

/// Human readable label for a resolver endpoint, used when reporting.
///
/// The declaration order is also the sort order of the labels, so a
/// `BTreeMap` keyed by identity iterates alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServerIdentity {
    Cloudflare,
    Google,
    Local,
    Unknown,
}

impl ServerIdentity {
    /// Maps a raw `ip:port` endpoint to its label.
    /// Only exact matches are recognised; everything else is `Unknown`.
    pub fn from_endpoint(endpoint: &str) -> Self {
        match endpoint {
            "1.1.1.1:53" => ServerIdentity::Cloudflare,
            "8.8.8.8:53" => ServerIdentity::Google,
            "192.168.0.1:53" => ServerIdentity::Local,
            _ => ServerIdentity::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServerIdentity::Cloudflare => "Cloudflare",
            ServerIdentity::Google => "Google",
            ServerIdentity::Local => "Local",
            ServerIdentity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
