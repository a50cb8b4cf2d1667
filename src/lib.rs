//! # Rustkasa
//!
//! Asynchronous TP-Link Kasa smart plug local API implementation. Discovers
//! plugs on the local network via UDP broadcast and controls them directly,
//! without cloud dependencies.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rustkasa::SmartPlug;
//!
//! # async fn demo() -> rustkasa::error::Result<()> {
//! let plug = SmartPlug::hs110("192.168.1.50".parse().unwrap());
//! let info = plug.sysinfo().await?;
//! println!("{} is {}", info.alias, if info.is_on() { "on" } else { "off" });
//! # Ok(())
//! # }
//! ```
//!
pub mod crypto;
pub mod device;
pub mod error;
pub mod protocol;
pub mod response;
pub mod scanner;
pub mod transport;

pub use device::{PlugModel, SmartPlug};
pub use error::KasaError;
pub use protocol::{Action, RuleSpec, TimeOption, Weekdays};
pub use response::{Response, SysInfo};
pub use scanner::{DiscoveryResult, Scanner};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}
