use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

pub const UDP_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
pub const TCP_ANSWER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 53);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Answers every query with `UDP_ANSWER`.
    Answer,
    /// Answers with the TC bit set.
    Truncated,
    /// Answers with the id of the query flipped.
    WrongId,
    /// Reads queries and never replies.
    Silent,
}

/// Local upstream for forwarding tests.
///
/// The UDP side follows `MockMode`; the optional TCP side on the same port
/// answers with `TCP_ANSWER`, or with one large TXT record when started via
/// `start_with_large_tcp`.
pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown_tx: Vec<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(mode: MockMode) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;

        let (tx, rx) = oneshot::channel();
        tokio::spawn(run_udp(socket, mode, rx));

        Ok(Self {
            addr,
            shutdown_tx: vec![tx],
        })
    }

    /// UDP in `mode` plus a TCP listener on the same port.
    pub async fn start_with_tcp(mode: MockMode) -> Result<Self, std::io::Error> {
        Self::start_with_tcp_reply(mode, None).await
    }

    /// Like `start_with_tcp`, but TCP answers with a TXT record of about
    /// `txt_size` bytes.
    pub async fn start_with_large_tcp(
        mode: MockMode,
        txt_size: usize,
    ) -> Result<Self, std::io::Error> {
        Self::start_with_tcp_reply(mode, Some(txt_size)).await
    }

    async fn start_with_tcp_reply(
        mode: MockMode,
        txt_size: Option<usize>,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let socket = UdpSocket::bind(addr).await?;

        let (udp_tx, udp_rx) = oneshot::channel();
        let (tcp_tx, tcp_rx) = oneshot::channel();
        tokio::spawn(run_udp(socket, mode, udp_rx));
        tokio::spawn(run_tcp(listener, txt_size, tcp_rx));

        Ok(Self {
            addr,
            shutdown_tx: vec![udp_tx, tcp_tx],
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(mut self) {
        for tx in self.shutdown_tx.drain(..) {
            let _ = tx.send(());
        }
    }

    pub fn build_mock_response(query: &[u8], ip: Ipv4Addr, truncated: bool) -> Vec<u8> {
        if query.len() < 12 {
            return vec![];
        }

        let mut response = Vec::with_capacity(512);

        response.extend_from_slice(&query[0..2]);

        response.push(if truncated { 0x83 } else { 0x81 });
        response.push(0x80);

        response.extend_from_slice(&query[4..6]);

        response.extend_from_slice(&[0x00, 0x01]);

        response.extend_from_slice(&[0x00, 0x00]);

        response.extend_from_slice(&[0x00, 0x00]);

        if query.len() > 12 {
            response.extend_from_slice(&query[12..]);
        }

        let octets = ip.octets();
        response.extend_from_slice(&[
            0xc0, 0x0c,
            0x00, 0x01,
            0x00, 0x01,
            0x00, 0x00, 0x00, 0x3c,
            0x00, 0x04,
            octets[0], octets[1], octets[2], octets[3],
        ]);

        response
    }
}

impl MockDnsServer {
    /// One TXT answer made of 250-byte strings, about `size` bytes of RDATA.
    pub fn build_txt_response(query: &[u8], size: usize) -> Vec<u8> {
        if query.len() < 12 {
            return vec![];
        }

        let mut rdata = Vec::with_capacity(size);
        for _ in 0..size / 250 {
            rdata.push(250u8);
            rdata.extend(std::iter::repeat(b'x').take(250));
        }

        let mut response = Vec::with_capacity(query.len() + rdata.len() + 12);
        response.extend_from_slice(&query[0..2]);
        response.extend_from_slice(&[0x81, 0x80]);
        response.extend_from_slice(&query[4..6]);
        response.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        response.extend_from_slice(&query[12..]);
        response.extend_from_slice(&[
            0xc0, 0x0c,
            0x00, 0x10,
            0x00, 0x01,
            0x00, 0x00, 0x00, 0x3c,
        ]);
        response.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        response.extend_from_slice(&rdata);

        response
    }
}

async fn run_udp(socket: UdpSocket, mode: MockMode, mut shutdown_rx: oneshot::Receiver<()>) {
    let mut buf = vec![0u8; 512];

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            result = socket.recv_from(&mut buf) => {
                let Ok((len, peer)) = result else { continue };
                let query = &buf[..len];

                let response = match mode {
                    MockMode::Answer => MockDnsServer::build_mock_response(query, UDP_ANSWER, false),
                    MockMode::Truncated => MockDnsServer::build_mock_response(query, UDP_ANSWER, true),
                    MockMode::WrongId => {
                        let mut response = MockDnsServer::build_mock_response(query, UDP_ANSWER, false);
                        if response.len() >= 2 {
                            response[0] ^= 0xff;
                        }
                        response
                    }
                    MockMode::Silent => continue,
                };

                let _ = socket.send_to(&response, peer).await;
            }
        }
    }
}

async fn run_tcp(
    listener: TcpListener,
    txt_size: Option<usize>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            result = listener.accept() => {
                let Ok((mut stream, _)) = result else { continue };
                tokio::spawn(async move {
                    let mut len_buf = [0u8; 2];
                    if stream.read_exact(&mut len_buf).await.is_err() {
                        return;
                    }
                    let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                    if stream.read_exact(&mut query).await.is_err() {
                        return;
                    }

                    let response = match txt_size {
                        Some(size) => MockDnsServer::build_txt_response(&query, size),
                        None => MockDnsServer::build_mock_response(&query, TCP_ANSWER, false),
                    };
                    let _ = stream.write_all(&(response.len() as u16).to_be_bytes()).await;
                    let _ = stream.write_all(&response).await;
                });
            }
        }
    }
}
