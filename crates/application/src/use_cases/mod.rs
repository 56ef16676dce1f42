pub mod dns;
pub mod redirect;

pub use dns::{DnsReply, HandleDnsQueryUseCase, QueryOutcome};
pub use redirect::ResolveShortcutUseCase;
