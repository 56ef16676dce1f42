use shorty_application::use_cases::ResolveShortcutUseCase;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub resolve_shortcut: Arc<ResolveShortcutUseCase>,
}

impl AppState {
    pub fn new(resolve_shortcut: Arc<ResolveShortcutUseCase>) -> Self {
        Self { resolve_shortcut }
    }
}
