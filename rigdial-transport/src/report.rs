//! Report decoding
//!
//! Turns the integer view of a raw report into a [`DeviceSnapshot`]. Every
//! bit pattern is valid input; bits outside the masks below are ignored.

use crate::types::{DeviceSnapshot, RawReport, BUTTON_COUNT};

/// Bit masks over the 40-bit integer view of a report.
///
/// Positions are as observed on the wire. Buttons 0-3 live in the fourth
/// byte, button 4 in the last one.
pub mod mask {
    /// Per-button bits, indexed by button number
    pub const BUTTONS: [u64; super::BUTTON_COUNT] = [0x1000, 0x2000, 0x4000, 0x8000, 0x0001];
    /// Shuttle nibble (first byte, low half)
    pub const SHUTTLE: u64 = 0x0F_0000_0000;
    /// Jog counter (second byte)
    pub const JOG: u64 = 0x00_FF00_0000;
}

const SHUTTLE_SHIFT: u32 = 32;
const JOG_SHIFT: u32 = 24;

/// Decode one raw report
pub fn decode(raw: &RawReport) -> DeviceSnapshot {
    let bits = raw.bits();

    let mut buttons = [false; BUTTON_COUNT];
    for (state, bit) in buttons.iter_mut().zip(mask::BUTTONS) {
        *state = bits & bit != 0;
    }

    let nibble = ((bits & mask::SHUTTLE) >> SHUTTLE_SHIFT) as u8;
    let jog_counter = ((bits & mask::JOG) >> JOG_SHIFT) as u8;

    DeviceSnapshot {
        buttons,
        shuttle_level: shuttle_level(nibble),
        jog_counter,
    }
}

/// Signed shuttle level from the 4-bit nibble: 0..=8 as is, 9..=15 → -7..=-1
pub fn shuttle_level(nibble: u8) -> i8 {
    let nibble = (nibble & 0x0F) as i8;
    if nibble > 8 {
        nibble - 16
    } else {
        nibble
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_idle_report() {
        let snap = decode(&RawReport::from_bits(0));
        assert_eq!(snap, DeviceSnapshot::default());
    }

    #[test]
    fn test_button_bits() {
        let cases = [(0x1000u64, 0usize), (0x2000, 1), (0x4000, 2), (0x8000, 3), (0x0001, 4)];
        for (bits, index) in cases {
            let snap = decode(&RawReport::from_bits(bits));
            for (i, &pressed) in snap.buttons.iter().enumerate() {
                assert_eq!(pressed, i == index, "bits {bits:#x} button {i}");
            }
        }
    }

    #[test]
    fn test_shuttle_nibbles() {
        assert_eq!(shuttle_level(0), 0);
        assert_eq!(shuttle_level(1), 1);
        assert_eq!(shuttle_level(8), 8);
        assert_eq!(shuttle_level(9), -7);
        assert_eq!(shuttle_level(15), -1);
    }

    #[test]
    fn test_shuttle_from_report() {
        assert_eq!(decode(&RawReport::from_bits(0x09_0000_0000)).shuttle_level, -7);
        assert_eq!(decode(&RawReport::from_bits(0x08_0000_0000)).shuttle_level, 8);
        // High nibble of the first byte is not part of the shuttle
        assert_eq!(decode(&RawReport::from_bits(0xF3_0000_0000)).shuttle_level, 3);
    }

    #[test]
    fn test_jog_counter() {
        let snap = decode(&RawReport::from_bytes(&[0x00, 0xFA, 0x00, 0x00, 0x00]));
        assert_eq!(snap.jog_counter, 250);
        assert_eq!(snap.shuttle_level, 0);
    }

    #[test]
    fn test_shuttlexpress_bytes() {
        // shuttle -2, jog 0x31, button 2 held, button 4 held
        let snap = decode(&RawReport::from_bytes(&[0x0E, 0x31, 0x00, 0x40, 0x01]));
        assert_eq!(snap.shuttle_level, -2);
        assert_eq!(snap.jog_counter, 0x31);
        assert_eq!(snap.buttons, [false, false, true, false, true]);
    }

    proptest! {
        #[test]
        fn prop_button0_bit_is_isolated(bits in 0u64..(1u64 << 40)) {
            let without = decode(&RawReport::from_bits(bits & !0x1000));
            let with = decode(&RawReport::from_bits(bits | 0x1000));
            prop_assert!(!without.buttons[0]);
            prop_assert!(with.buttons[0]);
            prop_assert_eq!(&without.buttons[1..], &with.buttons[1..]);
            prop_assert_eq!(without.shuttle_level, with.shuttle_level);
            prop_assert_eq!(without.jog_counter, with.jog_counter);
        }

        #[test]
        fn prop_shuttle_in_range(nibble in 0u8..16) {
            let level = shuttle_level(nibble);
            prop_assert!((-7..=8).contains(&level));
        }
    }
}
