use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::redirect::RedirectConfig;

/// Prefix for environment overrides, e.g. `SHORTY_DNS_PORT`.
pub const ENV_PREFIX: &str = "SHORTY_";

const LOCAL_CONFIG_FILE: &str = "shorty.toml";
const LOCAL_CONFIG_DIR_FILE: &str = "config/shorty.toml";
const HOME_CONFIG_FILE: &str = ".shorty/config.toml";

/// Main configuration structure for Shorty
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// DNS responder configuration
    #[serde(default)]
    pub dns: DnsConfig,

    /// HTTP redirector configuration
    #[serde(default)]
    pub redirect: RedirectConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. shorty.toml in current directory
    /// 3. config/shorty.toml
    /// 4. $HOME/.shorty/config.toml
    /// 5. Default configuration
    ///
    /// `SHORTY_*` environment variables are applied on top of the file, then
    /// command-line overrides on top of those.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::get_config_path() {
                Some(found) => Self::from_file(&found)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides(std::env::vars())?;
        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `SHORTY_*` overrides from the given variables.
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match name {
                "DNS_PORT" => self.dns.port = parse_port(&key, &value)?,
                "DNS_UPSTREAM_DNS" => self.dns.upstream_dns = value,
                "DNS_LOCAL_IP" => self.dns.local_ip = value,
                "DNS_EXTENSION" => self.dns.extension = value,
                "REDIRECT_PORT" => self.redirect.port = parse_port(&key, &value)?,
                "REDIRECT_ADDRESS" => self.redirect.address = value,
                "LOG_LEVEL" => self.logging.level = value,
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.dns.port = port;
        }
        if let Some(port) = overrides.http_port {
            self.redirect.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.redirect.address = bind;
        }
        if let Some(upstream) = overrides.upstream_dns {
            self.dns.upstream_dns = upstream;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dns.validate()?;
        self.redirect.validate()?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Write the default configuration to `path`.
    pub fn write_default(path: &str) -> Result<(), ConfigError> {
        Self::default().save(path)
    }

    /// Get the path to the configuration file that `load` would pick
    pub fn get_config_path() -> Option<String> {
        let mut candidates = vec![
            PathBuf::from(LOCAL_CONFIG_FILE),
            PathBuf::from(LOCAL_CONFIG_DIR_FILE),
        ];
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(HOME_CONFIG_FILE));
        }

        candidates
            .into_iter()
            .find(|p| p.exists())
            .map(|p| p.to_string_lossy().into_owned())
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Override(key.to_string(), value.to_string()))
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub http_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream_dns: Option<String>,
    pub log_level: Option<String>,
}
