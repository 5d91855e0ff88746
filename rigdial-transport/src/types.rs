//! Common types for the transport layer

/// Number of buttons on the controller
pub const BUTTON_COUNT: usize = 5;

/// Width of the integer view of a report, in bits
pub const REPORT_BITS: u32 = 40;

const REPORT_MASK: u64 = (1 << REPORT_BITS) - 1;

/// One raw input report, held as its big-endian integer view.
///
/// The device delivers a short byte buffer per read. Treating the whole
/// buffer as one big-endian integer gives the view the bit masks in
/// [`crate::report`] are defined against; only the low 40 bits carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawReport(u64);

impl RawReport {
    /// Build a report from its integer view (masked to 40 bits)
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & REPORT_MASK)
    }

    /// Fold a read buffer of any length into the integer view.
    ///
    /// Longer buffers keep their trailing 5 bytes, shorter ones behave as if
    /// zero-padded on the left.
    pub fn from_bytes(data: &[u8]) -> Self {
        let bits = data
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        Self::from_bits(bits)
    }

    /// The integer view of this report
    pub const fn bits(&self) -> u64 {
        self.0
    }
}

/// Decoded state of every control at the time of one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceSnapshot {
    /// Button states, index 0..=4
    pub buttons: [bool; BUTTON_COUNT],
    /// Signed shuttle deflection, -7..=8
    pub shuttle_level: i8,
    /// Free-running jog counter
    pub jog_counter: u8,
}

/// Semantic input event derived from successive reports
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A button changed state
    ButtonChanged {
        /// Button index 0..=4
        index: u8,
        /// New state
        pressed: bool,
    },
    /// The shuttle ring moved to a new level (0 = released)
    ShuttleChanged {
        /// Signed shuttle level
        level: i8,
    },
    /// The jog wheel turned
    JogTick {
        /// Counter value after the turn
        raw_value: u8,
        /// Signed tick count since the previous counter value
        delta: i32,
        /// Milliseconds since the previous report (at least 1)
        delta_time_ms: u64,
        /// Scaled rotation speed, see [`crate::input::JOG_VELOCITY_GAIN`]
        velocity: f64,
    },
}

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Platform HID path used to open the device
    pub path: String,
    /// Manufacturer string if available
    pub manufacturer: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
    /// USB interface number
    pub interface_number: i32,
}

impl DeviceInfo {
    /// Short human-readable label for logs and thread names
    pub fn label(&self) -> String {
        match self.product_name.as_deref() {
            Some(name) => format!("{name} ({:04x}:{:04x})", self.vid, self.pid),
            None => format!("{:04x}:{:04x}", self.vid, self.pid),
        }
    }
}

/// Discovered device that can be opened
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: DeviceInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_big_endian() {
        let report = RawReport::from_bytes(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(report.bits(), 0x01_0203_0405);
    }

    #[test]
    fn test_from_bytes_keeps_low_40_bits() {
        let report = RawReport::from_bytes(&[0xAA, 0xBB, 0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(report.bits(), 0x01_0203_0405);
    }

    #[test]
    fn test_from_bytes_short_buffer() {
        assert_eq!(RawReport::from_bytes(&[0x10, 0x00]).bits(), 0x1000);
        assert_eq!(RawReport::from_bytes(&[]).bits(), 0);
    }

    #[test]
    fn test_from_bits_masks() {
        assert_eq!(RawReport::from_bits(0xFFFF_FFFF_FFFF_FFFF).bits(), 0xFF_FFFF_FFFF);
    }

    #[test]
    fn test_label() {
        let info = DeviceInfo {
            vid: 0x0b33,
            pid: 0x0020,
            path: "/dev/hidraw3".into(),
            manufacturer: Some("Contour Design".into()),
            product_name: Some("ShuttleXpress".into()),
            interface_number: 0,
        };
        assert_eq!(info.label(), "ShuttleXpress (0b33:0020)");
    }
}
