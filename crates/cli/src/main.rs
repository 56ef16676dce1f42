use clap::Parser;
use shorty_domain::{CliOverrides, Config};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "shorty")]
#[command(version)]
#[command(about = "Shorty - vanity-TLD DNS resolver and shortcut redirector")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Write the default configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_default_config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Redirect (HTTP) server port
    #[arg(short = 'w', long)]
    http_port: Option<u16>,

    /// Redirect server bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream DNS server (host:port)
    #[arg(short = 'u', long, value_name = "HOST:PORT")]
    upstream: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.write_default_config.as_deref() {
        Config::write_default(path)?;
        println!("Default configuration written to {}", path);
        return Ok(());
    }

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        http_port: cli.http_port,
        bind_address: cli.bind.clone(),
        upstream_dns: cli.upstream.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging)?;

    info!("Starting Shorty v{}", env!("CARGO_PKG_VERSION"));
    match bootstrap::config_source(cli.config.as_deref()) {
        Some(path) => info!(path = %path, "Configuration loaded"),
        None => info!("No configuration file found, using defaults"),
    }

    let dns_services = di::DnsServices::new(&config)?;
    let redirect_services = di::RedirectServices::new(&config)?;

    info!(
        pseudo_domain = %dns_services.use_case.pseudo_domain(),
        "Answering pseudo-domain locally"
    );

    let (udp_socket, tcp_listener) = server::bind_dns_sockets_any(config.dns.port)?;

    let shutdown = CancellationToken::new();

    let mut dns_task = tokio::spawn(server::start_dns_server(
        udp_socket,
        tcp_listener,
        dns_services.handler,
        shutdown.clone(),
    ));

    let mut web_task = tokio::spawn(server::start_web_server(
        config.redirect.listen_addr(),
        redirect_services.app_state,
        shutdown.clone(),
    ));

    let mut dns_done = false;
    let mut web_done = false;

    let outcome = tokio::select! {
        _ = wait_for_shutdown() => Ok(()),
        result = &mut dns_task => {
            dns_done = true;
            flatten("DNS server", result)
        }
        result = &mut web_task => {
            web_done = true;
            flatten("Redirect server", result)
        }
    };

    shutdown.cancel();

    let remaining = [
        ("DNS server", dns_task, dns_done),
        ("Redirect server", web_task, web_done),
    ];
    for (name, task, done) in remaining {
        if done {
            continue;
        }
        if let Err(e) = flatten(name, task.await) {
            error!(error = %e, "{} did not stop cleanly", name);
        }
    }

    match &outcome {
        Ok(()) => info!("Server shutdown complete"),
        Err(e) => error!(error = %e, "Server stopped with an error"),
    }

    outcome
}

fn flatten(
    name: &str,
    result: Result<anyhow::Result<()>, tokio::task::JoinError>,
) -> anyhow::Result<()> {
    match result {
        Ok(inner) => inner,
        Err(e) => Err(anyhow::anyhow!("{} task panicked: {}", name, e)),
    }
}

async fn wait_for_shutdown() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
