use crate::ports::UpstreamExchange;
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use shorty_domain::{ClientTransport, DomainError, PseudoDomain};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Local answers must never be cached by clients.
const LOCAL_ANSWER_TTL: u32 = 0;

/// RFC 1035 limit for UDP replies without EDNS.
const MIN_UDP_PAYLOAD: u16 = 512;

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Name under the pseudo-domain, answered with the local address.
    LocalAnswer,
    /// Upstream response relayed verbatim.
    Forwarded,
    /// Upstream failed; the client got REFUSED.
    ForwardFailed,
    /// Message carried no question; the client got REFUSED.
    Rejected,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalAnswer => "local",
            Self::Forwarded => "forwarded",
            Self::ForwardFailed => "forward_failed",
            Self::Rejected => "rejected",
        }
    }
}

/// Wire-format reply ready to be written back to the client.
#[derive(Debug, Clone)]
pub struct DnsReply {
    pub outcome: QueryOutcome,
    pub bytes: Vec<u8>,
}

pub struct HandleDnsQueryUseCase {
    exchange: Arc<dyn UpstreamExchange>,
    upstream: String,
    local_ip: IpAddr,
    pseudo_domain: PseudoDomain,
    timeout: Duration,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        exchange: Arc<dyn UpstreamExchange>,
        upstream: impl Into<String>,
        local_ip: IpAddr,
        pseudo_domain: PseudoDomain,
    ) -> Self {
        Self {
            exchange,
            upstream: upstream.into(),
            local_ip,
            pseudo_domain,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pseudo_domain(&self) -> &PseudoDomain {
        &self.pseudo_domain
    }

    /// Classifies one inbound message and produces the reply to send.
    ///
    /// Returns `None` only when the bytes are not a DNS message at all; every
    /// parseable query gets an answer, a relayed upstream response or REFUSED.
    pub async fn execute(&self, query_bytes: &[u8], client: ClientTransport) -> Option<DnsReply> {
        let request = match Message::from_vec(query_bytes) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, len = query_bytes.len(), "Dropping unparseable DNS message");
                return None;
            }
        };

        let Some(question) = request.queries().first() else {
            warn!(id = request.id(), "DNS message without a question, refusing");
            return self.refuse(&request, QueryOutcome::Rejected);
        };

        let name = question.name().to_ascii();

        if self.pseudo_domain.matches_fqdn(&name) {
            return self.answer_locally(&request, question, &name);
        }

        self.forward(&request, query_bytes, &name, client).await
    }

    fn answer_locally(&self, request: &Message, question: &Query, name: &str) -> Option<DnsReply> {
        let rdata = match self.local_ip {
            IpAddr::V4(ipv4) => RData::A(A(ipv4)),
            IpAddr::V6(ipv6) => RData::AAAA(AAAA(ipv6)),
        };

        let mut reply = reply_to(request);
        reply.set_authoritative(true);
        reply.add_answer(Record::from_rdata(
            question.name().clone(),
            LOCAL_ANSWER_TTL,
            rdata,
        ));

        match serialize_message(&reply) {
            Ok(bytes) => {
                info!(
                    domain = %name,
                    record_type = ?question.query_type(),
                    local_ip = %self.local_ip,
                    "Local DNS answer"
                );
                Some(DnsReply {
                    outcome: QueryOutcome::LocalAnswer,
                    bytes,
                })
            }
            Err(e) => {
                error!(domain = %name, error = %e, "Failed to encode local answer");
                self.refuse(request, QueryOutcome::Rejected)
            }
        }
    }

    async fn forward(
        &self,
        request: &Message,
        query_bytes: &[u8],
        name: &str,
        client: ClientTransport,
    ) -> Option<DnsReply> {
        let result = tokio::time::timeout(
            self.timeout,
            self.exchange.exchange(query_bytes, &self.upstream, client),
        )
        .await
        .unwrap_or(Err(DomainError::QueryTimeout))
        .and_then(|bytes| {
            Message::from_vec(&bytes)
                .map(|_| bytes)
                .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))
        });

        match result {
            Ok(bytes)
                if client == ClientTransport::Udp && bytes.len() > udp_payload_limit(request) =>
            {
                debug!(
                    domain = %name,
                    len = bytes.len(),
                    limit = udp_payload_limit(request),
                    "Upstream answer too large for UDP client, sending TC"
                );
                self.truncated(request)
            }
            Ok(bytes) => {
                info!(
                    domain = %name,
                    upstream = %self.upstream,
                    client_transport = client.as_str(),
                    "Forwarded DNS query"
                );
                Some(DnsReply {
                    outcome: QueryOutcome::Forwarded,
                    bytes,
                })
            }
            Err(e) => {
                warn!(
                    domain = %name,
                    upstream = %self.upstream,
                    error = %e,
                    "Failed to forward DNS query"
                );
                self.refuse(request, QueryOutcome::ForwardFailed)
            }
        }
    }

    /// Header and question only, TC set, so the client retries over TCP.
    fn truncated(&self, request: &Message) -> Option<DnsReply> {
        let mut reply = reply_to(request);
        reply.set_truncated(true);

        match serialize_message(&reply) {
            Ok(bytes) => Some(DnsReply {
                outcome: QueryOutcome::Forwarded,
                bytes,
            }),
            Err(e) => {
                error!(id = request.id(), error = %e, "Failed to encode truncated reply");
                None
            }
        }
    }

    fn refuse(&self, request: &Message, outcome: QueryOutcome) -> Option<DnsReply> {
        let mut reply = reply_to(request);
        reply.set_response_code(ResponseCode::Refused);

        match serialize_message(&reply) {
            Ok(bytes) => {
                debug!(id = request.id(), outcome = outcome.as_str(), "Sending REFUSED");
                Some(DnsReply { outcome, bytes })
            }
            Err(e) => {
                error!(id = request.id(), error = %e, "Failed to encode REFUSED reply");
                None
            }
        }
    }
}

/// Response skeleton mirroring the request: same id, opcode, RD and CD flags
/// and question section. RA stays clear.
fn reply_to(request: &Message) -> Message {
    let mut reply = Message::new(request.id(), MessageType::Response, request.op_code());
    reply.set_recursion_desired(request.recursion_desired());
    reply.set_checking_disabled(request.checking_disabled());
    for query in request.queries() {
        reply.add_query(query.clone());
    }
    reply
}

/// Largest reply a UDP client accepts: its EDNS payload size, never below 512.
fn udp_payload_limit(request: &Message) -> usize {
    usize::from(request.max_payload().max(MIN_UDP_PAYLOAD))
}

fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);

    message.emit(&mut encoder).map_err(|e| {
        DomainError::InvalidDnsMessage(format!("Failed to serialize DNS message: {}", e))
    })?;

    Ok(buf)
}
