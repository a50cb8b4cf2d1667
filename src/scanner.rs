//! UDP broadcast discovery of Kasa devices.
//! Sends one encoded `get_sysinfo` query to the subnet broadcast address and
//! collects replies until the discovery window closes. Window expiry is the
//! normal termination condition, never an error.

use crate::crypto;
use crate::error::{KasaError, Result};
use crate::protocol::{self, DEVICE_PORT, DISCOVERY_PORT};
use crate::response::{Response, SysInfo};
use async_stream::stream;
use futures_core::stream::Stream;
use log::{debug, info, warn};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::{Duration, Instant, timeout};

/// DiscoveryResult pairs a responding device's address with its parsed sysinfo.
///
/// Replies are not deduplicated; a device that retransmits appears twice.
/// Callers that care about identity should key on `info.device_id`, not the
/// network address.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Address the reply arrived from
    pub addr: SocketAddr,
    /// Parsed device state
    pub info: SysInfo,
}

/// Scanner discovers Kasa devices on the local network using UDP broadcast.
#[derive(Debug, Clone)]
pub struct Scanner {
    /// Length of the discovery window
    pub timeout: Duration,
    /// Local address to bind to
    pub bind_addr: String,
    /// Local port replies are collected on
    pub listen_port: u16,
    /// Broadcast address the query is sent to
    pub broadcast_addr: String,
    /// Port devices listen on
    pub device_port: u16,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Create a new Scanner with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            bind_addr: "0.0.0.0".to_string(),
            listen_port: DISCOVERY_PORT,
            broadcast_addr: "255.255.255.255".to_string(),
            device_port: DEVICE_PORT,
        }
    }

    /// Set the discovery window length.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the local bind address.
    pub fn with_bind_addr<S: Into<String>>(mut self, addr: S) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the local port replies are collected on.
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    /// Set the broadcast address the query is sent to.
    pub fn with_broadcast_addr<S: Into<String>>(mut self, addr: S) -> Self {
        self.broadcast_addr = addr.into();
        self
    }

    /// Set the port devices listen on.
    pub fn with_device_port(mut self, port: u16) -> Self {
        self.device_port = port;
        self
    }

    /// Create and configure the discovery socket.
    fn create_socket(&self) -> Result<UdpSocket> {
        let addr: SocketAddr = format!("{}:{}", self.bind_addr, self.listen_port)
            .parse()
            .map_err(|e| KasaError::Connection(format!("invalid bind address: {e}")))?;

        debug!("Creating discovery socket on {}...", addr);
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| KasaError::Connection(e.to_string()))?;

        if let Err(e) = socket.set_reuse_address(true) {
            warn!("Failed to set reuse_address on {}: {}", addr, e);
        }

        socket
            .set_broadcast(true)
            .map_err(|e| KasaError::Connection(e.to_string()))?;
        socket
            .bind(&SockAddr::from(addr))
            .map_err(|e| KasaError::Connection(e.to_string()))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| KasaError::Connection(e.to_string()))?;

        let std_socket: std::net::UdpSocket = socket.into();
        UdpSocket::from_std(std_socket).map_err(|e| KasaError::Connection(e.to_string()))
    }

    /// Resolve the broadcast target and send the encoded discovery query once.
    async fn send_probe(&self, socket: &UdpSocket) -> Result<()> {
        let broadcast: SocketAddr = format!("{}:{}", self.broadcast_addr, self.device_port)
            .parse()
            .map_err(|e| KasaError::Transport(format!("invalid broadcast address: {e}")))?;

        let probe = crypto::encrypt(protocol::GET_SYSINFO.as_bytes());
        let sent = socket
            .send_to(&probe, broadcast)
            .await
            .map_err(|e| KasaError::Transport(e.to_string()))?;
        debug!("Sent {} byte discovery probe to {}", sent, broadcast);
        Ok(())
    }

    /// Scans the local network for Kasa devices.
    ///
    /// Blocks until the discovery window closes, then returns everything
    /// heard, in arrival order. An empty subnet yields `Ok(vec![])`, not an
    /// error. A socket-level read failure mid-window aborts the scan and
    /// discards partial results.
    pub async fn scan(&self) -> Result<Vec<DiscoveryResult>> {
        info!(
            "Starting Kasa device scan (bind: {}:{}, window: {:?})...",
            self.bind_addr, self.listen_port, self.timeout
        );

        let mut results = Vec::new();
        self.run_window(|addr, plaintext| {
            if let Some(res) = parse_reply(addr, &plaintext) {
                results.push(res);
            }
        })
        .await?;

        info!("Scan finished. Found {} devices.", results.len());
        Ok(results)
    }

    /// Like [`scan`](Self::scan), but yields the decoded plaintext unparsed,
    /// for callers that bring their own reply model.
    pub async fn scan_raw(&self) -> Result<Vec<(SocketAddr, String)>> {
        let mut results = Vec::new();
        self.run_window(|addr, plaintext| results.push((addr, plaintext)))
            .await?;
        Ok(results)
    }

    /// Incremental scan: devices are yielded as they answer and the stream
    /// ends when the window closes. Setup or read failures end the stream
    /// early (logged at warn).
    pub fn scan_stream(&self) -> impl Stream<Item = DiscoveryResult> + Send + 'static {
        let scanner = self.clone();
        stream! {
            let socket = match scanner.create_socket() {
                Ok(s) => s,
                Err(e) => {
                    warn!("Discovery socket setup failed: {}", e);
                    return;
                }
            };
            if let Err(e) = scanner.send_probe(&socket).await {
                warn!("Discovery probe failed: {}", e);
                return;
            }

            let window_end = Instant::now() + scanner.timeout;
            let mut buf = vec![0u8; 2048];
            loop {
                let remaining = window_end.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match timeout(remaining, socket.recv_from(&mut buf)).await {
                    Err(_) => break,
                    Ok(Err(e)) => {
                        warn!("Discovery read failed: {}", e);
                        break;
                    }
                    Ok(Ok((len, addr))) => {
                        let plaintext =
                            String::from_utf8_lossy(&crypto::decrypt(&buf[..len])).into_owned();
                        if let Some(res) = parse_reply(addr, &plaintext) {
                            yield res;
                        }
                    }
                }
            }
        }
    }

    /// One discovery window: bind, probe once, then read until the deadline.
    ///
    /// The deadline-exceeded read is the loop's normal exit; every other read
    /// error surfaces as a transport failure.
    async fn run_window<F>(&self, mut sink: F) -> Result<()>
    where
        F: FnMut(SocketAddr, String),
    {
        let socket = self.create_socket()?;
        self.send_probe(&socket).await?;

        let window_end = Instant::now() + self.timeout;
        let mut buf = vec![0u8; 2048];
        loop {
            let remaining = window_end.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, socket.recv_from(&mut buf)).await {
                Err(_) => break,
                Ok(Err(e)) => return Err(KasaError::Transport(e.to_string())),
                Ok(Ok((len, addr))) => {
                    debug!("Received {} byte reply from {}", len, addr);
                    let plaintext =
                        String::from_utf8_lossy(&crypto::decrypt(&buf[..len])).into_owned();
                    sink(addr, plaintext);
                }
            }
        }
        Ok(())
    }
}

/// Parse a decoded reply into a DiscoveryResult, skipping anything that is
/// not a sysinfo response. A foreign datagram on the port must not kill
/// discovery.
fn parse_reply(addr: SocketAddr, plaintext: &str) -> Option<DiscoveryResult> {
    match Response::parse(plaintext) {
        Ok(resp) => match resp.system.get_sysinfo {
            Some(info) => Some(DiscoveryResult { addr, info }),
            None => {
                debug!("Reply from {} carried no sysinfo, skipping", addr);
                None
            }
        },
        Err(e) => {
            debug!("Undecodable reply from {}: {}", addr, e);
            None
        }
    }
}
