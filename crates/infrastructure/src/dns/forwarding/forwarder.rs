use crate::dns::transport::tcp::TcpTransport;
use crate::dns::transport::udp::UdpTransport;
use crate::dns::transport::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use shorty_application::ports::UpstreamExchange;
use shorty_domain::{ClientTransport, DomainError, UpstreamProtocol};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Relays raw query bytes to the upstream resolver and returns its reply
/// untouched.
///
/// Over UDP a truncated reply is retried once over TCP, but only for TCP
/// clients. A UDP client gets the truncated reply and re-asks over TCP.
pub struct UpstreamForwarder {
    protocol: UpstreamProtocol,
    timeout: Duration,
}

impl UpstreamForwarder {
    pub fn new(protocol: UpstreamProtocol, timeout: Duration) -> Self {
        Self { protocol, timeout }
    }

    pub fn protocol(&self) -> UpstreamProtocol {
        self.protocol
    }

    async fn resolve_server(server: &str) -> Result<SocketAddr, DomainError> {
        if let Ok(addr) = server.parse::<SocketAddr>() {
            return Ok(addr);
        }

        tokio::net::lookup_host(server)
            .await
            .map_err(|e| {
                DomainError::InvalidUpstreamAddress(format!("{}: {}", server, e))
            })?
            .next()
            .ok_or_else(|| {
                DomainError::InvalidUpstreamAddress(format!("{}: no addresses", server))
            })
    }

    async fn send_via(
        &self,
        transport: &dyn DnsTransport,
        query: &[u8],
    ) -> Result<TransportResponse, DomainError> {
        let response = transport.send(query, self.timeout).await?;
        check_response_id(query, &response.bytes)?;
        Ok(response)
    }
}

#[async_trait]
impl UpstreamExchange for UpstreamForwarder {
    async fn exchange(
        &self,
        query: &[u8],
        server: &str,
        client: ClientTransport,
    ) -> Result<Vec<u8>, DomainError> {
        let server_addr = Self::resolve_server(server).await?;

        let response = match self.protocol {
            UpstreamProtocol::Tcp => self.send_via(&TcpTransport::new(server_addr), query).await?,
            UpstreamProtocol::Udp => {
                let response = self.send_via(&UdpTransport::new(server_addr), query).await?;
                if response.is_truncated() && client == ClientTransport::Tcp {
                    debug!(server = %server_addr, "UDP response truncated, retrying over TCP");
                    self.send_via(&TcpTransport::new(server_addr), query).await?
                } else {
                    response
                }
            }
        };

        debug!(
            server = %server_addr,
            protocol = response.protocol_used,
            bytes = response.bytes.len(),
            "Upstream exchange complete"
        );

        Ok(response.bytes)
    }
}

fn check_response_id(query: &[u8], response: &[u8]) -> Result<(), DomainError> {
    if query.len() < 2 || response.len() < 2 {
        return Err(DomainError::InvalidDnsResponse(
            "message shorter than a DNS header".to_string(),
        ));
    }

    let expected = u16::from_be_bytes([query[0], query[1]]);
    let got = u16::from_be_bytes([response[0], response[1]]);

    if expected != got {
        return Err(DomainError::ResponseIdMismatch { expected, got });
    }

    Ok(())
}
