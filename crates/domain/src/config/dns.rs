use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use super::errors::ConfigError;
use crate::pseudo_domain::PseudoDomain;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream resolver as `host:port`.
    #[serde(default = "default_upstream_dns")]
    pub upstream_dns: String,

    /// Address handed out for every name under the pseudo-domain.
    #[serde(default = "default_local_ip")]
    pub local_ip: String,

    /// Pseudo top-level label, without dots. Shared with the redirector.
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default)]
    pub upstream_protocol: UpstreamProtocol,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamProtocol {
    #[default]
    Udp,

    Tcp,
}

impl UpstreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upstream_dns: default_upstream_dns(),
            local_ip: default_local_ip(),
            extension: default_extension(),
            query_timeout_ms: default_query_timeout_ms(),
            upstream_protocol: UpstreamProtocol::default(),
        }
    }
}

impl DnsConfig {
    pub fn local_ip_addr(&self) -> Result<IpAddr, ConfigError> {
        self.local_ip.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("local_ip '{}' is not an IP address", self.local_ip))
        })
    }

    pub fn pseudo_domain(&self) -> Result<PseudoDomain, ConfigError> {
        PseudoDomain::new(&self.extension).map_err(|e| ConfigError::Validation(e.to_string()))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        validate_upstream(&self.upstream_dns)?;
        self.local_ip_addr()?;
        self.pseudo_domain()?;

        if self.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_upstream(upstream: &str) -> Result<(), ConfigError> {
    let (host, port) = upstream.rsplit_once(':').ok_or_else(|| {
        ConfigError::Validation(format!("upstream_dns '{}' must be host:port", upstream))
    })?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(ConfigError::Validation(format!(
            "upstream_dns '{}' has an empty host",
            upstream
        )));
    }

    match port.parse::<u16>() {
        Ok(p) if p != 0 => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "upstream_dns '{}' has an invalid port",
            upstream
        ))),
    }
}

fn default_port() -> u16 {
    53
}

fn default_upstream_dns() -> String {
    "1.1.1.1:53".to_string()
}

fn default_local_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_extension() -> String {
    "u".to_string()
}

fn default_query_timeout_ms() -> u64 {
    2000
}
