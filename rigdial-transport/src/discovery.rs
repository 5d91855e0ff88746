//! Device discovery and blocking report sources

use std::ffi::CString;

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

use crate::device_registry::SupportedDevice;
use crate::error::TransportError;
use crate::types::{DeviceInfo, DiscoveredDevice, RawReport};

/// Read buffer size; larger than any report the supported devices send
const READ_BUFFER_LEN: usize = 64;

/// A blocking sequence of raw reports from one bound device
pub trait ReportSource: Send {
    /// Block until the next report arrives.
    ///
    /// There is no timeout. An error means the device is gone and the
    /// source must not be read again.
    fn next_report(&mut self) -> Result<RawReport, TransportError>;

    /// Human-readable device label
    fn label(&self) -> &str;
}

/// HID device discovery against a table of supported models
pub struct HidDiscovery {
    supported: Vec<SupportedDevice>,
}

impl HidDiscovery {
    /// Create a discovery instance for the given device table
    pub fn new(supported: Vec<SupportedDevice>) -> Self {
        Self { supported }
    }

    fn is_supported(&self, device_info: &hidapi::DeviceInfo) -> bool {
        self.supported.iter().any(|d| {
            d.matches(
                device_info.vendor_id(),
                device_info.product_id(),
                device_info.product_string(),
            )
        })
    }

    /// List currently connected supported devices, one per HID path
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new()?;
        let mut devices: Vec<DiscoveredDevice> = Vec::new();

        for device_info in api.device_list() {
            if !self.is_supported(device_info) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            if devices.iter().any(|d| d.info.path == path) {
                continue;
            }

            let info = DeviceInfo {
                vid: device_info.vendor_id(),
                pid: device_info.product_id(),
                path,
                manufacturer: device_info.manufacturer_string().map(|s| s.to_string()),
                product_name: device_info.product_string().map(|s| s.to_string()),
                interface_number: device_info.interface_number(),
            };

            debug!(
                "Found device: VID={:04X} PID={:04X} iface={} path={}",
                info.vid, info.pid, info.interface_number, info.path
            );

            devices.push(DiscoveredDevice { info });
        }

        info!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Open a discovered device as a blocking report source
    pub fn open(&self, device: &DiscoveredDevice) -> Result<HidReportSource, TransportError> {
        let api = HidApi::new()?;
        let path = CString::new(device.info.path.as_bytes())
            .map_err(|_| TransportError::InvalidPath(device.info.path.clone()))?;
        let hid = api.open_path(&path)?;
        // Reads must block until data arrives
        hid.set_blocking_mode(true)?;

        Ok(HidReportSource::new(hid, device.info.label()))
    }
}

/// Report source backed by an open HID device
pub struct HidReportSource {
    device: HidDevice,
    label: String,
    buf: [u8; READ_BUFFER_LEN],
}

impl HidReportSource {
    /// Wrap an already opened HID device
    pub fn new(device: HidDevice, label: String) -> Self {
        Self {
            device,
            label,
            buf: [0u8; READ_BUFFER_LEN],
        }
    }
}

impl ReportSource for HidReportSource {
    fn next_report(&mut self) -> Result<RawReport, TransportError> {
        loop {
            let len = self.device.read(&mut self.buf)?;
            if len == 0 {
                continue;
            }
            debug!(
                "{} report {} bytes: {:02X?}",
                self.label,
                len,
                &self.buf[..len.min(16)]
            );
            return Ok(RawReport::from_bytes(&self.buf[..len]));
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}
