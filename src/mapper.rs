//! Input-event-to-radio mapping
//!
//! Turns [`InputEvent`]s from one controller into radio adjustments.
//!
//! | Control                | Action                                        |
//! |------------------------|-----------------------------------------------|
//! | Button 0               | PTT while held                                |
//! | Button 2 (press)       | Toggle fine/coarse tuning step                |
//! | Button 3 (held) + jog  | Mic gain                                      |
//! | Button 4 (held) + jog  | Power                                         |
//! | Jog                    | VFO, velocity-scaled                          |
//! | Shuttle, then release  | Band step in the direction of the excursion   |

use std::sync::Arc;

use rigdial_transport::InputEvent;
use tracing::{debug, info};

use crate::band::{BandStep, BandTable};
use crate::radio::{RadioError, RadioLink};

/// Button roles
pub mod button {
    /// Push-to-talk
    pub const PTT: u8 = 0;
    /// Tuning step toggle
    pub const STEP_TOGGLE: u8 = 2;
    /// Hold to turn the jog into a mic gain control
    pub const MIC_GAIN_MODIFIER: u8 = 3;
    /// Hold to turn the jog into a power control
    pub const POWER_MODIFIER: u8 = 4;
}

/// Power and mic gain are kept within this range
const LEVEL_RANGE: (i32, i32) = (0, 100);

/// Jog speed multiplier for a given velocity.
///
/// Tiers use strict `<`: exactly 30 is already the 4x tier.
pub fn velocity_multiplier(velocity: f64) -> i64 {
    let speed = velocity.abs();
    if speed < 30.0 {
        1
    } else if speed < 60.0 {
        4
    } else if speed < 90.0 {
        9
    } else {
        15
    }
}

/// Minimum VFO step, toggled between a fine and a coarse value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    fine_hz: u32,
    coarse_hz: u32,
    current_hz: u32,
}

impl StepPolicy {
    /// Start on the fine step
    pub fn new(fine_hz: u32, coarse_hz: u32) -> Self {
        Self {
            fine_hz,
            coarse_hz,
            current_hz: fine_hz,
        }
    }

    /// Current minimum step in Hz
    pub fn current(&self) -> u32 {
        self.current_hz
    }

    /// Switch to the other step size and return it
    pub fn toggle(&mut self) -> u32 {
        self.current_hz = if self.current_hz == self.coarse_hz {
            self.fine_hz
        } else {
            self.coarse_hz
        };
        self.current_hz
    }
}

/// Largest shuttle deflection since the ring last returned to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ShuttleExcursion {
    peak: i8,
}

impl ShuttleExcursion {
    fn record(&mut self, level: i8) {
        if level.unsigned_abs() > self.peak.unsigned_abs() {
            self.peak = level;
        }
    }

    /// Consume the excursion; negative moves up the table, positive down
    fn take_direction(&mut self) -> Option<BandStep> {
        let peak = std::mem::take(&mut self.peak);
        match peak.signum() {
            -1 => Some(BandStep::Next),
            1 => Some(BandStep::Previous),
            _ => None,
        }
    }
}

/// What the mapper did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum RadioAction {
    /// Transmitter keyed or unkeyed
    Ptt(bool),
    /// Tuning step switched to this many Hz
    StepSize(u32),
    /// Mic gain set to this level
    MicGain(i32),
    /// Output power set to this level
    Power(i32),
    /// VFO tuned to this frequency in Hz
    Vfo(u64),
    /// Moved to a band's home frequency with split cleared
    Band { name: &'static str, vfo_hz: u64 },
}

/// Per-controller mapping state
pub struct ControlMapper {
    link: Arc<dyn RadioLink>,
    bands: BandTable,
    steps: StepPolicy,
    mic_gain_held: bool,
    power_held: bool,
    excursion: ShuttleExcursion,
}

impl ControlMapper {
    /// Create a mapper issuing calls through `link`
    pub fn new(link: Arc<dyn RadioLink>, bands: BandTable, steps: StepPolicy) -> Self {
        Self {
            link,
            bands,
            steps,
            mic_gain_held: false,
            power_held: false,
            excursion: ShuttleExcursion::default(),
        }
    }

    /// Current tuning step policy
    pub fn steps(&self) -> &StepPolicy {
        &self.steps
    }

    /// Handle one event.
    ///
    /// Returns the action taken, if any. A radio error means the action was
    /// dropped; it is not retried.
    pub fn handle(&mut self, event: &InputEvent) -> Result<Option<RadioAction>, RadioError> {
        match *event {
            InputEvent::ButtonChanged { index, pressed } => {
                info!("Event Button {} state {}", index, pressed);
                self.on_button(index, pressed)
            }
            InputEvent::ShuttleChanged { level } => {
                info!("Event Shuttle value {}", level);
                self.on_shuttle(level)
            }
            InputEvent::JogTick {
                raw_value,
                delta,
                delta_time_ms,
                velocity,
            } => {
                info!(
                    "Event Jog Value {} Delta Value {} Delta Time {} Velocity {:.0}",
                    raw_value, delta, delta_time_ms, velocity
                );
                self.on_jog(delta, velocity).map(Some)
            }
        }
    }

    fn on_button(&mut self, index: u8, pressed: bool) -> Result<Option<RadioAction>, RadioError> {
        match index {
            button::PTT => {
                self.link.set_ptt(pressed)?;
                Ok(Some(RadioAction::Ptt(pressed)))
            }
            button::STEP_TOGGLE if pressed => {
                let step = self.steps.toggle();
                info!("Minimum frequency change is now {}", step);
                Ok(Some(RadioAction::StepSize(step)))
            }
            button::MIC_GAIN_MODIFIER => {
                self.mic_gain_held = pressed;
                Ok(None)
            }
            button::POWER_MODIFIER => {
                self.power_held = pressed;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn on_shuttle(&mut self, level: i8) -> Result<Option<RadioAction>, RadioError> {
        if level != 0 {
            self.excursion.record(level);
            return Ok(None);
        }

        let Some(direction) = self.excursion.take_direction() else {
            return Ok(None);
        };

        let vfo = self.link.get_vfo()?;
        let current = self.bands.classify(vfo);
        let target = self.bands.step(current, direction);
        let Some(band) = self.bands.get(target) else {
            return Ok(None);
        };

        info!("Changing band to {} at {} Hz", band.name, band.home_hz);
        self.link.set_vfo(band.home_hz)?;
        self.link.set_split(0)?;
        Ok(Some(RadioAction::Band {
            name: band.name,
            vfo_hz: band.home_hz,
        }))
    }

    fn on_jog(&mut self, delta: i32, velocity: f64) -> Result<RadioAction, RadioError> {
        if self.mic_gain_held {
            let gain = clamp_level(self.link.get_mic_gain()? + delta);
            info!("Setting Mic Gain {}", gain);
            self.link.set_mic_gain(gain)?;
            return Ok(RadioAction::MicGain(gain));
        }

        if self.power_held {
            let power = clamp_level(self.link.get_power()? + delta);
            info!("Setting power level to {}", power);
            self.link.set_power(power)?;
            return Ok(RadioAction::Power(power));
        }

        let vfo = self.link.get_vfo()?;
        let multiplier = velocity_multiplier(velocity);
        let change = i64::from(self.steps.current()) * i64::from(delta) * multiplier;
        let target = (vfo as i64).saturating_add(change).max(0) as u64;
        debug!(vfo, change, multiplier, "jog tuning");
        info!("Setting new VFO frequency {}", target);
        self.link.set_vfo(target)?;
        Ok(RadioAction::Vfo(target))
    }
}

fn clamp_level(value: i32) -> i32 {
    value.clamp(LEVEL_RANGE.0, LEVEL_RANGE.1)
}
