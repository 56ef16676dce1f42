pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use shorty_domain::DomainError;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

impl TransportResponse {
    /// TC bit of the header flags.
    pub fn is_truncated(&self) -> bool {
        self.bytes.len() > 2 && self.bytes[2] & 0x02 != 0
    }
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}
