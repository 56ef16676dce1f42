mod resolve_shortcut;

pub use resolve_shortcut::ResolveShortcutUseCase;
