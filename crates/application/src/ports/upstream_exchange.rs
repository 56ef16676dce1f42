use async_trait::async_trait;
use shorty_domain::{ClientTransport, DomainError};

/// Sends one DNS message to an upstream resolver and returns its answer.
///
/// `query` is the wire-format message exactly as the client sent it and
/// `server` the configured `host:port`. Implementations return the raw
/// response bytes untouched so they can be relayed verbatim.
///
/// For a `ClientTransport::Udp` client a truncated upstream answer must be
/// returned as-is; the client re-asks over TCP itself.
#[async_trait]
pub trait UpstreamExchange: Send + Sync {
    async fn exchange(
        &self,
        query: &[u8],
        server: &str,
        client: ClientTransport,
    ) -> Result<Vec<u8>, DomainError>;
}
