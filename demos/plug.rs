/**
 * Plug Control Example
 *
 * Queries a plug's state and toggles its relay.
 *
 * Usage: cargo run --example plug -- <PLUG_IP>
 */
use rustkasa::SmartPlug;

#[tokio::main]
async fn main() {
    env_logger::init();

    let ip = std::env::args()
        .nth(1)
        .expect("usage: plug <PLUG_IP>")
        .parse()
        .expect("invalid IP address");

    println!("--- Rustkasa - Plug Control ---");

    let plug = SmartPlug::hs110(ip);

    let info = plug.sysinfo().await.expect("sysinfo query failed");
    println!(
        "[INFO] {} ({}) is {}",
        info.alias,
        info.model,
        if info.is_on() { "on" } else { "off" }
    );

    let status = if info.is_on() {
        println!("[INFO] Turning off...");
        plug.turn_off().await.expect("turn_off failed")
    } else {
        println!("[INFO] Turning on...");
        plug.turn_on().await.expect("turn_on failed")
    };
    println!("[INFO] Device replied with err_code={}", status.err_code);

    if plug.model().supports_energy_metering() {
        match plug.realtime_meter().await {
            Ok(rt) => println!("[INFO] Power draw: {:.1} W @ {:.1} V", rt.power, rt.voltage),
            Err(e) => println!("[WARN] Meter query failed: {e}"),
        }
    }
}
