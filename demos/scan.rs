/**
 * Scanner Example
 *
 * This example demonstrates how to use the UDP broadcast scanner to find
 * Kasa smart plugs on the local network in real-time using a Stream.
 */
use futures_util::StreamExt;
use rustkasa::Scanner;
use tokio::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::init();

    println!("--- Rustkasa - Scanner ---");
    println!("[INFO] Scanning the network for Kasa devices in real-time...");

    let scanner = Scanner::new().with_timeout(Duration::from_secs(3));

    let stream = scanner.scan_stream();
    tokio::pin!(stream);

    let mut count = 0;
    while let Some(device) = stream.next().await {
        count += 1;
        println!(
            "[{}] Found Device: alias={:?}, model={}, addr={}, state={}",
            count,
            device.info.alias,
            device.info.model,
            device.addr,
            if device.info.is_on() { "on" } else { "off" },
        );
    }

    println!("[INFO] Scan finished. Total devices found: {count}");
}
