//! Remote radio control
//!
//! [`RadioLink`] is the capability the mapper and the status bridge talk
//! to. [`FlrigClient`] implements it over flrig's XML-RPC interface.

pub mod flrig;
pub mod xmlrpc;

pub use flrig::FlrigClient;

use thiserror::Error;

/// Errors from remote radio calls
#[derive(Error, Debug)]
pub enum RadioError {
    #[error("Radio transport error: {0}")]
    Transport(String),

    #[error("Radio endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed XML-RPC response: {0}")]
    Protocol(String),

    #[error("Radio fault: {0}")]
    Fault(String),

    #[error("Unexpected value for {method}: {value}")]
    UnexpectedValue { method: &'static str, value: String },
}

impl From<reqwest::Error> for RadioError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RadioError::HttpStatus(status.as_u16()),
            None => RadioError::Transport(e.to_string()),
        }
    }
}

/// Get/set access to a remote transceiver.
///
/// Every call may fail; callers drop the failed action and carry on.
pub trait RadioLink: Send + Sync {
    /// Current VFO frequency in Hz
    fn get_vfo(&self) -> Result<u64, RadioError>;
    /// Tune the VFO
    fn set_vfo(&self, hz: u64) -> Result<(), RadioError>;
    /// Whether the transmitter is keyed
    fn get_ptt(&self) -> Result<bool, RadioError>;
    /// Key or unkey the transmitter
    fn set_ptt(&self, on: bool) -> Result<(), RadioError>;
    /// Output power setting
    fn get_power(&self) -> Result<i32, RadioError>;
    /// Change output power
    fn set_power(&self, power: i32) -> Result<(), RadioError>;
    /// Microphone gain setting
    fn get_mic_gain(&self) -> Result<i32, RadioError>;
    /// Change microphone gain
    fn set_mic_gain(&self, gain: i32) -> Result<(), RadioError>;
    /// Operating mode name, e.g. `USB-D`
    fn get_mode(&self) -> Result<String, RadioError>;
    /// Split setting
    fn get_split(&self) -> Result<i32, RadioError>;
    /// Change split
    fn set_split(&self, split: i32) -> Result<(), RadioError>;
}
