use super::messages::upstream_answer;
use async_trait::async_trait;
use hickory_proto::op::ResponseCode;
use shorty_application::ports::UpstreamExchange;
use shorty_domain::{ClientTransport, DomainError};
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

enum Behaviour {
    Answer(Ipv4Addr, ResponseCode),
    Fixed(Vec<u8>),
    Fail(DomainError),
    Hang,
}

pub struct MockUpstreamExchange {
    behaviour: Behaviour,
    calls: Mutex<Vec<(Vec<u8>, String)>>,
    transports: Mutex<Vec<ClientTransport>>,
}

impl MockUpstreamExchange {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
            transports: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(ip: Ipv4Addr) -> Self {
        Self::with(Behaviour::Answer(ip, ResponseCode::NoError))
    }

    pub fn with_rcode(rcode: ResponseCode) -> Self {
        Self::with(Behaviour::Answer(Ipv4Addr::UNSPECIFIED, rcode))
    }

    pub fn returning(bytes: Vec<u8>) -> Self {
        Self::with(Behaviour::Fixed(bytes))
    }

    pub fn failing(error: DomainError) -> Self {
        Self::with(Behaviour::Fail(error))
    }

    pub fn hanging() -> Self {
        Self::with(Behaviour::Hang)
    }

    pub fn calls(&self) -> Vec<(Vec<u8>, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transports(&self) -> Vec<ClientTransport> {
        self.transports.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UpstreamExchange for MockUpstreamExchange {
    async fn exchange(
        &self,
        query: &[u8],
        server: &str,
        client: ClientTransport,
    ) -> Result<Vec<u8>, DomainError> {
        self.transports.lock().unwrap().push(client);
        self.calls
            .lock()
            .unwrap()
            .push((query.to_vec(), server.to_string()));

        match &self.behaviour {
            Behaviour::Answer(ip, rcode) => Ok(upstream_answer(query, *ip, *rcode)),
            Behaviour::Fixed(bytes) => Ok(bytes.clone()),
            Behaviour::Fail(error) => Err(error.clone()),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DomainError::QueryTimeout)
            }
        }
    }
}
