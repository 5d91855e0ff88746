//! Input event derivation
//!
//! [`InputEventEngine`] diffs each decoded report against the previous one
//! and emits edge-triggered [`InputEvent`]s. It does no I/O; the caller
//! supplies the report and a monotonic timestamp in milliseconds.

use tracing::trace;

use crate::report;
use crate::types::{InputEvent, RawReport, BUTTON_COUNT};

/// Gain applied to ticks/second to approximate wheel degrees/second
pub const JOG_VELOCITY_GAIN: f64 = 3.5;

/// Raw counter differences below this wrapped forward
const JOG_WRAP_LOW: i32 = -128;
/// Raw counter differences above this wrapped backward.
///
/// Not symmetric with [`JOG_WRAP_LOW`]; matches the observed hardware
/// behaviour and must stay as is until confirmed on a real device.
const JOG_WRAP_HIGH: i32 = 120;

/// Last observed jog counter and when it was seen
#[derive(Debug, Clone, Copy)]
struct JogState {
    value: u8,
    time_ms: u64,
}

/// Stateful report-to-event converter for one device
#[derive(Debug, Default)]
pub struct InputEventEngine {
    buttons: [bool; BUTTON_COUNT],
    shuttle_level: i8,
    jog: Option<JogState>,
}

impl InputEventEngine {
    /// Create an engine with all buttons released and the shuttle centred
    pub fn new() -> Self {
        Self::default()
    }

    /// Current button states as last reported
    pub fn buttons(&self) -> [bool; BUTTON_COUNT] {
        self.buttons
    }

    /// Process one report observed at `now_ms`.
    ///
    /// Returns button events in index order, then at most one shuttle event,
    /// then at most one jog event.
    pub fn process(&mut self, raw: &RawReport, now_ms: u64) -> Vec<InputEvent> {
        let snapshot = report::decode(raw);
        trace!(bits = raw.bits(), ?snapshot, "decoded report");

        let mut events = Vec::new();

        for (index, (stored, &pressed)) in self
            .buttons
            .iter_mut()
            .zip(snapshot.buttons.iter())
            .enumerate()
        {
            if *stored != pressed {
                *stored = pressed;
                events.push(InputEvent::ButtonChanged {
                    index: index as u8,
                    pressed,
                });
            }
        }

        if snapshot.shuttle_level != self.shuttle_level {
            self.shuttle_level = snapshot.shuttle_level;
            events.push(InputEvent::ShuttleChanged {
                level: snapshot.shuttle_level,
            });
        }

        if let Some(event) = self.update_jog(snapshot.jog_counter, now_ms) {
            events.push(event);
        }

        events
    }

    fn update_jog(&mut self, value: u8, now_ms: u64) -> Option<InputEvent> {
        let Some(last) = self.jog else {
            // First observation only seeds the state
            self.jog = Some(JogState {
                value,
                time_ms: now_ms,
            });
            return None;
        };

        // Time advances on every report, even without a counter change
        let delta_time_ms = now_ms.saturating_sub(last.time_ms).max(1);
        self.jog = Some(JogState {
            value,
            time_ms: now_ms,
        });

        if value == last.value {
            return None;
        }

        let delta = jog_delta(last.value, value);
        Some(InputEvent::JogTick {
            raw_value: value,
            delta,
            delta_time_ms,
            velocity: jog_velocity(delta, delta_time_ms),
        })
    }
}

/// Signed tick count between two counter values, corrected for wraparound
pub fn jog_delta(old: u8, new: u8) -> i32 {
    let mut delta = i32::from(new) - i32::from(old);
    if delta < JOG_WRAP_LOW {
        delta += 256;
    }
    if delta > JOG_WRAP_HIGH {
        delta -= 256;
    }
    delta
}

/// Scaled jog velocity; `delta_time_ms` of 0 is treated as 1
pub fn jog_velocity(delta: i32, delta_time_ms: u64) -> f64 {
    let dt = delta_time_ms.max(1) as f64;
    (f64::from(delta) / dt) * 1000.0 * JOG_VELOCITY_GAIN
}
