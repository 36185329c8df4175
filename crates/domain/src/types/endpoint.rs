//! Endpoint discovery types

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Coarse network classification of a candidate host (diagnostics/ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    Wifi,
    MobileData,
    Hotspot,
    Loopback,
    #[default]
    Unknown,
}

impl NetworkType {
    /// Wire name of the network type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::MobileData => "mobile-data",
            Self::Hotspot => "hotspot",
            Self::Loopback => "loopback",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wifi" => Ok(Self::Wifi),
            "mobile-data" | "mobile" | "cellular" => Ok(Self::MobileData),
            "hotspot" => Ok(Self::Hotspot),
            "loopback" | "local" => Ok(Self::Loopback),
            "unknown" | "" => Ok(Self::Unknown),
            other => Err(format!("unknown network type: {other}")),
        }
    }
}

/// One host the backend might be reachable through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    /// Host name or address, optionally with an explicit `:port`
    pub host: String,
    #[serde(default)]
    pub network: NetworkType,
}

impl EndpointCandidate {
    #[must_use]
    pub fn new(host: impl Into<String>, network: NetworkType) -> Self {
        Self { host: host.into(), network }
    }

    /// `host[:port]`, appending `default_port` only when the host has none
    #[must_use]
    pub fn authority(&self, default_port: Option<u16>) -> String {
        match default_port {
            Some(port) if !self.has_explicit_port() => format!("{}:{port}", self.host),
            _ => self.host.clone(),
        }
    }

    fn has_explicit_port(&self) -> bool {
        // Bracketed IPv6 literals carry their port after the closing bracket.
        let tail = self.host.rsplit(']').next().unwrap_or(&self.host);
        tail.contains(':')
    }
}

impl FromStr for EndpointCandidate {
    type Err = String;

    /// Parses `host` or `host@network` (e.g. `192.168.1.20@wifi`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty endpoint candidate".to_string());
        }
        match s.split_once('@') {
            Some((host, network)) if !host.is_empty() => {
                Ok(Self::new(host, network.parse::<NetworkType>()?))
            }
            Some(_) => Err(format!("invalid endpoint candidate: {s}")),
            None => Ok(Self::new(s, NetworkType::Unknown)),
        }
    }
}

impl fmt::Display for EndpointCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.host, self.network.as_str())
    }
}

/// The currently believed-reachable API base address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub base_url: String,
    /// Winning candidate, `None` for static or default addresses
    pub candidate: Option<EndpointCandidate>,
    /// False when every candidate failed and the default was used
    pub connected: bool,
    pub resolved_at: Instant,
}

impl ResolvedEndpoint {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        candidate: Option<EndpointCandidate>,
        connected: bool,
    ) -> Self {
        Self { base_url: base_url.into(), candidate, connected, resolved_at: Instant::now() }
    }

    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.resolved_at.elapsed() >= ttl
    }
}
