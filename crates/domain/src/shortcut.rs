use std::collections::{BTreeMap, HashMap};

/// Short name to target URL. Keys are matched exactly, as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortcuts {
    entries: HashMap<String, String>,
}

impl Shortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for Shortcuts {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl From<BTreeMap<String, String>> for Shortcuts {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Shortcuts {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Outcome of looking up a Host value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Redirect { host: String, target: String },
    NotFound { host: String },
}

impl RedirectDecision {
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Redirect { target, .. } => Some(target),
            Self::NotFound { .. } => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}
