use anyhow::Context;
use shorty_infrastructure::dns::transport::tcp::{read_with_length_prefix, send_with_length_prefix};
use shorty_domain::ClientTransport;
use shorty_infrastructure::dns::DnsServerHandler;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const MAX_UDP_QUERY_SIZE: usize = 4096;

/// Idle TCP connections are closed after this long without a new query.
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Binds the UDP socket and then a TCP listener on the same port.
///
/// Binding port 0 picks a free UDP port and reuses it for TCP.
pub fn bind_dns_sockets(bind_addr: SocketAddr) -> anyhow::Result<(UdpSocket, TcpListener)> {
    let domain = if bind_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let udp_socket = create_udp_socket(domain, bind_addr)
        .with_context(|| format!("Failed to bind DNS UDP socket on {}", bind_addr))?;

    let tcp_addr = udp_socket.local_addr()?;
    let tcp_listener = create_tcp_listener(domain, tcp_addr)
        .with_context(|| format!("Failed to bind DNS TCP listener on {}", tcp_addr))?;

    Ok((udp_socket, tcp_listener))
}

/// Binds `[::]:port` as a dual-stack socket pair, falling back to
/// `0.0.0.0:port` when IPv6 is unavailable.
pub fn bind_dns_sockets_any(port: u16) -> anyhow::Result<(UdpSocket, TcpListener)> {
    match bind_dns_sockets(SocketAddr::from((Ipv6Addr::UNSPECIFIED, port))) {
        Ok(sockets) => Ok(sockets),
        Err(e) => {
            warn!(error = %e, "IPv6 bind failed, DNS listening on IPv4 only");
            bind_dns_sockets(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        }
    }
}

/// Runs the UDP and TCP loops until `shutdown` fires or one of them fails.
pub async fn start_dns_server(
    udp_socket: UdpSocket,
    tcp_listener: TcpListener,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let local_addr = udp_socket.local_addr()?;
    let handler = Arc::new(handler);

    info!(bind_address = %local_addr, "DNS server ready (UDP + TCP)");

    let result = tokio::try_join!(
        run_udp(Arc::new(udp_socket), handler.clone(), shutdown.clone()),
        run_tcp(tcp_listener, handler, shutdown.clone()),
    );

    if result.is_err() {
        shutdown.cancel();
    }

    info!(bind_address = %local_addr, "DNS server stopped");
    result.map(|_| ())
}

async fn run_udp(
    socket: Arc<UdpSocket>,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let mut recv_buf = [0u8; MAX_UDP_QUERY_SIZE];
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            result = socket.recv_from(&mut recv_buf) => {
                let (len, from) = match result {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "UDP recv error");
                        continue;
                    }
                };

                let query: Arc<[u8]> = Arc::from(&recv_buf[..len]);
                let handler = handler.clone();
                let socket = socket.clone();

                in_flight.spawn(async move {
                    if let Some(response) = handler.handle_raw(&query, from, ClientTransport::Udp).await {
                        if let Err(e) = socket.send_to(&response, from).await {
                            debug!(client = %from, error = %e, "Failed to send UDP response");
                        }
                    }
                });
            }
        }
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}

async fn run_tcp(
    listener: TcpListener,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!(error = %e, "TCP accept error");
                        return Err(e).context("DNS TCP listener failed");
                    }
                };

                let handler = handler.clone();
                let shutdown = shutdown.clone();
                connections.spawn(async move {
                    serve_tcp_connection(stream, peer, handler, shutdown).await;
                });
            }
        }
    }

    while connections.join_next().await.is_some() {}
    Ok(())
}

async fn serve_tcp_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<DnsServerHandler>,
    shutdown: CancellationToken,
) {
    loop {
        let query = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = tokio::time::timeout(TCP_IDLE_TIMEOUT, read_with_length_prefix(&mut stream)) => {
                match read {
                    Ok(Ok(query)) => query,
                    Ok(Err(e)) => {
                        debug!(client = %peer, error = %e, "TCP connection closed");
                        break;
                    }
                    Err(_) => {
                        debug!(client = %peer, "TCP connection idle, closing");
                        break;
                    }
                }
            }
        };

        let Some(response) = handler.handle_raw(&query, peer, ClientTransport::Tcp).await else {
            continue;
        };

        if let Err(e) = send_with_length_prefix(&mut stream, &response).await {
            debug!(client = %peer, error = %e, "Failed to send TCP response");
            break;
        }
    }
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
