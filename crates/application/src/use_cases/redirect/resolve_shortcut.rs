use shorty_domain::{PseudoDomain, RedirectDecision, Shortcuts};
use std::sync::Arc;
use tracing::{debug, info};

/// Maps a request's Host value to a redirect target.
pub struct ResolveShortcutUseCase {
    shortcuts: Arc<Shortcuts>,
    pseudo_domain: PseudoDomain,
}

impl ResolveShortcutUseCase {
    pub fn new(shortcuts: Arc<Shortcuts>, pseudo_domain: PseudoDomain) -> Self {
        Self {
            shortcuts,
            pseudo_domain,
        }
    }

    /// Strips one trailing pseudo-domain suffix and looks the rest up
    /// verbatim. A bare short name without the suffix resolves too.
    pub fn execute(&self, host: &str) -> RedirectDecision {
        let short_name = self.pseudo_domain.strip_host(host);

        match self.shortcuts.get(short_name) {
            Some(target) => {
                info!(host = %host, target = %target, "Redirecting");
                RedirectDecision::Redirect {
                    host: host.to_string(),
                    target: target.to_string(),
                }
            }
            None => {
                debug!(host = %host, short_name = %short_name, "No shortcut for host");
                RedirectDecision::NotFound {
                    host: host.to_string(),
                }
            }
        }
    }

    pub fn shortcut_count(&self) -> usize {
        self.shortcuts.len()
    }
}
