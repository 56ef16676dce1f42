use crate::errors::DomainError;
use std::fmt;

/// The fake top-level label (e.g. `u`) whose names resolve locally.
///
/// One value is shared by the DNS dispatcher and the HTTP redirector so both
/// sides agree on the same suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoDomain {
    label: String,
    fqdn_suffix: String,
    host_suffix: String,
}

impl PseudoDomain {
    pub fn new(label: &str) -> Result<Self, DomainError> {
        let label = label.trim();

        if label.is_empty() {
            return Err(DomainError::InvalidPseudoDomain(
                "label cannot be empty".to_string(),
            ));
        }
        if label.contains('.') || label.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::InvalidPseudoDomain(format!(
                "'{}' must be a single label",
                label
            )));
        }

        Ok(Self {
            label: label.to_string(),
            fqdn_suffix: format!(".{}.", label),
            host_suffix: format!(".{}", label),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `".u."`, matched against fully-qualified question names.
    pub fn fqdn_suffix(&self) -> &str {
        &self.fqdn_suffix
    }

    /// `".u"`, stripped from HTTP Host values.
    pub fn host_suffix(&self) -> &str {
        &self.host_suffix
    }

    /// True when a fully-qualified name (trailing dot) sits under the
    /// pseudo-domain. DNS names compare ASCII case-insensitively.
    pub fn matches_fqdn(&self, name: &str) -> bool {
        let suffix = self.fqdn_suffix.as_bytes();
        let name = name.as_bytes();
        name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    }

    /// Removes one trailing `.u` from a Host value, literally. No case folding,
    /// no port trimming; a host without the suffix comes back unchanged.
    pub fn strip_host<'a>(&self, host: &'a str) -> &'a str {
        host.strip_suffix(self.host_suffix.as_str()).unwrap_or(host)
    }
}

impl Default for PseudoDomain {
    fn default() -> Self {
        Self {
            label: "u".to_string(),
            fqdn_suffix: ".u.".to_string(),
            host_suffix: ".u".to_string(),
        }
    }
}

impl fmt::Display for PseudoDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
