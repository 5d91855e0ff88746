//! Device registry - which HID devices speak the jog/shuttle report layout

use serde::{Deserialize, Serialize};

/// Contour Design vendor ID
pub const CONTOUR_VENDOR_ID: u16 = 0x0b33;
/// ShuttleXpress product ID
pub const PID_SHUTTLEXPRESS: u16 = 0x0020;
/// GN Netcom vendor ID
pub const GN_NETCOM_VENDOR_ID: u16 = 0x0b0e;
/// Jabra HANDSET 450 product ID
pub const PID_JABRA_HANDSET_450: u16 = 0x101b;

/// One bindable device model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedDevice {
    /// Manufacturer string, informational
    pub manufacturer: String,
    /// Product string; must match when the HID layer reports one
    pub product: String,
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
}

impl SupportedDevice {
    /// Check whether an enumerated HID interface is this model
    pub fn matches(&self, vid: u16, pid: u16, product: Option<&str>) -> bool {
        if vid != self.vendor_id || pid != self.product_id {
            return false;
        }
        match product {
            Some(name) if !name.is_empty() => name == self.product,
            _ => true,
        }
    }
}

/// Built-in device table
pub fn default_devices() -> Vec<SupportedDevice> {
    vec![
        SupportedDevice {
            manufacturer: "Contour Design".to_string(),
            product: "ShuttleXpress".to_string(),
            vendor_id: CONTOUR_VENDOR_ID,
            product_id: PID_SHUTTLEXPRESS,
        },
        SupportedDevice {
            manufacturer: "GN Netcom A/S".to_string(),
            product: "Jabra HANDSET 450".to_string(),
            vendor_id: GN_NETCOM_VENDOR_ID,
            product_id: PID_JABRA_HANDSET_450,
        },
    ]
}
