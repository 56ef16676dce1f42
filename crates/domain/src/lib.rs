//! Shorty Domain Layer
pub mod config;
pub mod errors;
pub mod pseudo_domain;
pub mod shortcut;
pub mod transport;

pub use config::{
    CliOverrides, Config, ConfigError, DnsConfig, LogFormat, LoggingConfig, RedirectConfig,
    UpstreamProtocol,
};
pub use errors::DomainError;
pub use pseudo_domain::PseudoDomain;
pub use shortcut::{RedirectDecision, Shortcuts};
pub use transport::ClientTransport;
