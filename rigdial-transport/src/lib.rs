//! Transport layer for jog/shuttle HID controllers
//!
//! This crate owns everything between the USB device and semantic input:
//!
//! - Device registry and HID discovery ([`HidDiscovery`])
//! - Blocking report sources ([`ReportSource`])
//! - Report decoding ([`report::decode`])
//! - Edge-triggered event derivation ([`InputEventEngine`])

pub mod device_registry;
pub mod error;
pub mod input;
pub mod report;
pub mod types;

mod discovery;

pub use device_registry::{default_devices, SupportedDevice};
pub use discovery::{HidDiscovery, HidReportSource, ReportSource};
pub use error::TransportError;
pub use input::InputEventEngine;
pub use types::{DeviceInfo, DeviceSnapshot, DiscoveredDevice, InputEvent, RawReport, BUTTON_COUNT};
