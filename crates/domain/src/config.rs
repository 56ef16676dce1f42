pub mod dns;
pub mod errors;
pub mod logging;
pub mod redirect;
pub mod root;

pub use dns::{DnsConfig, UpstreamProtocol};
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use redirect::RedirectConfig;
pub use root::{CliOverrides, Config, ENV_PREFIX};
