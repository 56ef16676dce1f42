use shorty_application::use_cases::HandleDnsQueryUseCase;
use shorty_domain::Config;
use shorty_infrastructure::dns::{DnsServerHandler, UpstreamForwarder};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: DnsServerHandler,
    pub use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let local_ip = config.dns.local_ip_addr()?;
        let pseudo_domain = config.dns.pseudo_domain()?;
        let timeout = config.dns.query_timeout();

        let forwarder = Arc::new(UpstreamForwarder::new(
            config.dns.upstream_protocol,
            timeout,
        ));

        info!(
            upstream = %config.dns.upstream_dns,
            protocol = config.dns.upstream_protocol.as_str(),
            local_ip = %local_ip,
            pseudo_domain = %pseudo_domain,
            timeout_ms = config.dns.query_timeout_ms,
            "Initializing DNS services"
        );

        let use_case = Arc::new(
            HandleDnsQueryUseCase::new(
                forwarder,
                config.dns.upstream_dns.clone(),
                local_ip,
                pseudo_domain,
            )
            .with_timeout(timeout),
        );

        Ok(Self {
            handler: DnsServerHandler::new(use_case.clone()),
            use_case,
        })
    }
}
