//! # Resolved Endpoint Model
//!
//! The host:port pair selected for all API traffic, and the branch of the
//! resolution state machine that produced it.

use std::fmt;
use std::net::Ipv6Addr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL of the REST API, always ending with a slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.url_host(), self.port)
    }

    fn url_host(&self) -> String {
        match self.host.parse::<Ipv6Addr>() {
            Ok(_) => format!("[{}]", self.host),
            Err(_) => self.host.clone(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.url_host(), self.port)
    }
}

/// Which branch of the resolver produced an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointSource {
    /// Emulator heuristic matched, the loopback alias was used.
    Emulator,
    /// Cached host answered its revalidation probe.
    Cache,
    /// Found by the subnet scan.
    Scan,
    /// Nothing else worked, the static default was used.
    Fallback,
}

impl fmt::Display for EndpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            EndpointSource::Emulator => "emulator",
            EndpointSource::Cache => "cache",
            EndpointSource::Scan => "scan",
            EndpointSource::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Terminal state of a resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub endpoint: Endpoint,
    pub source: EndpointSource,
}

impl Resolution {
    pub fn new(endpoint: Endpoint, source: EndpointSource) -> Self {
        Self { endpoint, source }
    }
}
