use shorty_application::use_cases::HandleDnsQueryUseCase;
use shorty_domain::ClientTransport;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Shared entry point for the UDP and TCP listeners: raw bytes in, raw bytes
/// out.
#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// `None` means nothing should be written back to the client.
    pub async fn handle_raw(
        &self,
        query: &[u8],
        client: SocketAddr,
        transport: ClientTransport,
    ) -> Option<Vec<u8>> {
        debug!(
            client = %client,
            transport = transport.as_str(),
            len = query.len(),
            "DNS query received"
        );

        let reply = self.use_case.execute(query, transport).await?;

        debug!(
            client = %client,
            transport = transport.as_str(),
            outcome = reply.outcome.as_str(),
            len = reply.bytes.len(),
            "DNS reply ready"
        );

        Some(reply.bytes)
    }
}
