use shorty_api::AppState;
use shorty_application::use_cases::ResolveShortcutUseCase;
use shorty_domain::Config;
use std::sync::Arc;
use tracing::info;

pub struct RedirectServices {
    pub app_state: AppState,
}

impl RedirectServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pseudo_domain = config.dns.pseudo_domain()?;
        let shortcuts = Arc::new(config.redirect.shortcut_table());

        let use_case = ResolveShortcutUseCase::new(shortcuts, pseudo_domain);
        info!(
            shortcuts = use_case.shortcut_count(),
            "Initializing redirect services"
        );

        Ok(Self {
            app_state: AppState::new(Arc::new(use_case)),
        })
    }
}
