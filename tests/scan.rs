//! Discovery window behavior over loopback UDP: empty-window success,
//! multi-reply aggregation, garbage tolerance, and socket release.

use futures_util::{StreamExt, pin_mut};
use rustkasa::error::KasaError;
use rustkasa::{Scanner, crypto, protocol, transport};
use tokio::net::UdpSocket;
use tokio::time::{Duration, Instant};

fn reply_for(alias: &str) -> String {
    format!(
        r#"{{"system":{{"get_sysinfo":{{"alias":"{alias}","deviceId":"id-{alias}","relay_state":0}}}}}}"#
    )
}

/// A fake device: receives the broadcast probe, then answers once per entry
/// in `replies`, each from its own socket so every reply has a distinct
/// sender address.
async fn spawn_device(replies: Vec<Vec<u8>>) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 2048];
        let (len, src) = socket.recv_from(&mut buf).await.unwrap();
        let probe = String::from_utf8(crypto::decrypt(&buf[..len])).unwrap();
        assert_eq!(probe, protocol::GET_SYSINFO);
        for reply in replies {
            let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
            sender.send_to(&reply, src).await.unwrap();
        }
    });
    port
}

fn loopback_scanner(device_port: u16) -> Scanner {
    Scanner::new()
        .with_bind_addr("127.0.0.1")
        .with_listen_port(0)
        .with_broadcast_addr("127.0.0.1")
        .with_device_port(device_port)
        .with_timeout(Duration::from_millis(300))
}

#[tokio::test]
async fn empty_window_is_success_not_error() {
    // A bound but silent "device": the probe lands, nothing answers.
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = silent.local_addr().unwrap().port();

    let scanner = loopback_scanner(port);
    let start = Instant::now();
    let results = scanner.scan().await.unwrap();
    let elapsed = start.elapsed();

    assert!(results.is_empty());
    assert!(elapsed >= Duration::from_millis(300), "window cut short: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "window overran: {elapsed:?}");
}

#[tokio::test]
async fn aggregates_replies_from_multiple_senders() {
    let port = spawn_device(vec![
        crypto::encrypt(reply_for("plug-a").as_bytes()),
        crypto::encrypt(reply_for("plug-b").as_bytes()),
    ])
    .await;

    let results = loopback_scanner(port).scan().await.unwrap();
    assert_eq!(results.len(), 2);

    let aliases: Vec<&str> = results.iter().map(|r| r.info.alias.as_str()).collect();
    assert!(aliases.contains(&"plug-a"));
    assert!(aliases.contains(&"plug-b"));
    assert_ne!(
        results[0].addr, results[1].addr,
        "each reply must keep its own sender address"
    );
}

#[tokio::test]
async fn garbage_datagrams_are_skipped() {
    let port = spawn_device(vec![
        b"\xde\xad\xbe\xef not a kasa reply".to_vec(),
        crypto::encrypt(reply_for("survivor").as_bytes()),
    ])
    .await;

    let results = loopback_scanner(port).scan().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].info.alias, "survivor");
}

#[tokio::test]
async fn scan_raw_yields_unparsed_plaintext() {
    let port = spawn_device(vec![crypto::encrypt(reply_for("raw").as_bytes())]).await;

    let results = loopback_scanner(port).scan_raw().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1, reply_for("raw"));
}

#[tokio::test]
async fn scan_stream_yields_incrementally_and_ends() {
    let port = spawn_device(vec![crypto::encrypt(reply_for("streamed").as_bytes())]).await;

    let stream = loopback_scanner(port).scan_stream();
    pin_mut!(stream);

    let first = stream.next().await.expect("one device should be yielded");
    assert_eq!(first.info.alias, "streamed");
    assert!(stream.next().await.is_none(), "stream must end with the window");
}

#[tokio::test]
async fn listen_port_is_released_after_scan() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let device_port = silent.local_addr().unwrap().port();

    // Reserve a concrete port, free it, and have the scanner use it.
    let probe = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let listen_port = probe.local_addr().unwrap().port();
    drop(probe);

    let scanner = loopback_scanner(device_port)
        .with_listen_port(listen_port)
        .with_timeout(Duration::from_millis(100));
    scanner.scan().await.unwrap();

    // Rebinding immediately must succeed; the scan socket is gone.
    UdpSocket::bind(("127.0.0.1", listen_port)).await.unwrap();
}

#[tokio::test]
async fn unreachable_device_fails_exchange_but_not_scan() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();

    let err = transport::exchange_addr(addr, protocol::GET_SYSINFO, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, KasaError::Timeout));

    let results = loopback_scanner(addr.port())
        .with_timeout(Duration::from_millis(100))
        .scan()
        .await
        .unwrap();
    assert!(results.is_empty());
}
