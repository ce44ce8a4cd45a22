//! Host header parsing.
//!
//! Splits `Host` into hostname and port and derives the root domain the
//! tenant resolver anchors on. Never fails: anything unexpected becomes a
//! hostname with no port.

use serde::Serialize;

/// Root domain used for `localhost` and every `*.localhost` name.
pub const LOCALHOST: &str = "localhost";

/// A host header split into its routing-relevant parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedHost {
    /// Lowercase hostname without port.
    pub hostname: String,
    /// Port as written in the header, if any.
    pub port: Option<String>,
    /// `localhost`, or the last two labels of `hostname`.
    pub root_domain: String,
}

impl ParsedHost {
    /// `name[:port]` using this host's port.
    pub fn authority_for(&self, name: &str) -> String {
        match &self.port {
            Some(port) => format!("{name}:{port}"),
            None => name.to_string(),
        }
    }
}

/// Parse a raw `Host` header value.
pub fn parse_host(host_header: &str) -> ParsedHost {
    let host_header = host_header.trim();

    let (hostname, port) = match host_header.rsplit_once(':') {
        Some((name, "")) => (name, None),
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => (name, Some(port)),
        _ => (host_header, None),
    };

    let hostname = hostname.to_ascii_lowercase();
    let root_domain = root_domain(&hostname);

    ParsedHost {
        hostname,
        port: port.map(str::to_string),
        root_domain,
    }
}

/// Compute the root domain for an already-lowercased hostname.
pub fn root_domain(hostname: &str) -> String {
    if hostname == LOCALHOST || hostname.ends_with(".localhost") {
        return LOCALHOST.to_string();
    }

    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        hostname.to_string()
    }
}
