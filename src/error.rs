//! Error types and result definitions for the rustkasa crate.
//! Covers socket setup, transport, deadline, and reply-decoding failures.

use thiserror::Error;

/// Represents all possible errors that can occur when communicating with a Kasa device.
#[derive(Error, Debug, Clone)]
pub enum KasaError {
    /// Socket could not be created, bound, or connected
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Send or receive failed for a reason other than deadline expiry
    #[error("Transport error: {0}")]
    Transport(String),

    /// The deadline elapsed before the device replied
    #[error("Timeout waiting for device")]
    Timeout,

    /// The decoded plaintext could not be parsed as a device reply
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Operation not available on this plug model
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// A specialized Result type for Kasa operations.
pub type Result<T> = std::result::Result<T, KasaError>;

impl From<serde_json::Error> for KasaError {
    fn from(err: serde_json::Error) -> Self {
        KasaError::MalformedReply(err.to_string())
    }
}
