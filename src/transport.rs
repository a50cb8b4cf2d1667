//! Single request/response exchange with an addressed device.
//! One datagram out, one datagram awaited, the whole round trip bounded by a
//! caller-supplied deadline. No retries; retry policy belongs to the caller.

use crate::crypto;
use crate::error::{KasaError, Result};
use crate::protocol::DEVICE_PORT;
use log::debug;
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::time::{Duration, timeout};

/// Sized to comfortably exceed any single plug reply.
const REPLY_BUFFER_SIZE: usize = 1500;

/// Send one command to a device on the standard Kasa port and await its reply.
pub async fn exchange(host: IpAddr, command: &str, deadline: Duration) -> Result<String> {
    exchange_addr(SocketAddr::new(host, DEVICE_PORT), command, deadline).await
}

/// Send one command to an explicit address and await its reply.
///
/// The deadline covers both the send and the receive. The socket lives only
/// for the duration of this call and is released on every exit path.
pub async fn exchange_addr(addr: SocketAddr, command: &str, deadline: Duration) -> Result<String> {
    let payload = crypto::encrypt(command.as_bytes());

    let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|e| KasaError::Connection(e.to_string()))?;
    socket
        .connect(addr)
        .await
        .map_err(|e| KasaError::Connection(e.to_string()))?;

    debug!("Sending {} byte command to {}", payload.len(), addr);

    let reply = timeout(deadline, async {
        socket
            .send(&payload)
            .await
            .map_err(|e| KasaError::Transport(e.to_string()))?;

        let mut buf = vec![0u8; REPLY_BUFFER_SIZE];
        let len = socket
            .recv(&mut buf)
            .await
            .map_err(|e| KasaError::Transport(e.to_string()))?;
        buf.truncate(len);
        Ok::<_, KasaError>(buf)
    })
    .await
    .map_err(|_| KasaError::Timeout)??;

    debug!("Received {} byte reply from {}", reply.len(), addr);
    Ok(String::from_utf8_lossy(&crypto::decrypt(&reply)).into_owned())
}
