use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::errors::ConfigError;
use crate::shortcut::Shortcuts;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_address")]
    pub address: String,

    /// Short name to absolute target URL. Entries from the file are added
    /// on top of the defaults; a file entry wins on the same name.
    #[serde(
        default = "default_shortcuts",
        deserialize_with = "merge_with_default_shortcuts"
    )]
    pub shortcuts: BTreeMap<String, String>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            address: default_address(),
            shortcuts: default_shortcuts(),
        }
    }
}

impl RedirectConfig {
    pub fn listen_addr(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    pub fn shortcut_table(&self) -> Shortcuts {
        Shortcuts::from(self.shortcuts.clone())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation(
                "Redirect port cannot be 0".to_string(),
            ));
        }

        if self.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Redirect address cannot be empty".to_string(),
            ));
        }

        for (name, target) in &self.shortcuts {
            if name.is_empty() || name.contains('.') {
                return Err(ConfigError::Validation(format!(
                    "Shortcut name '{}' must be non-empty and contain no dots",
                    name
                )));
            }
            if target.is_empty() || target.chars().any(char::is_control) {
                return Err(ConfigError::Validation(format!(
                    "Shortcut '{}' has an invalid target URL",
                    name
                )));
            }
        }

        Ok(())
    }
}

fn default_port() -> u16 {
    80
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_shortcuts() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("go".to_string(), "https://go.dev".to_string()),
        ("gh".to_string(), "https://github.com".to_string()),
        ("so".to_string(), "https://stackoverflow.com".to_string()),
    ])
}

fn merge_with_default_shortcuts<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let from_file = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut shortcuts = default_shortcuts();
    shortcuts.extend(from_file);
    Ok(shortcuts)
}
