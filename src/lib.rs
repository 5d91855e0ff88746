//! rigdial - jog/shuttle controller to flrig bridge
//!
//! Turns a USB jog/shuttle controller into a tuning knob for a radio driven
//! by flrig, and answers rigctld-style frequency queries from logging
//! programs.
//!
//! The device side (discovery, report decoding, event derivation) lives in
//! the `rigdial-transport` crate. This crate maps events onto radio actions
//! and hosts the status bridge.

pub mod band;
pub mod bridge;
pub mod config;
pub mod device;
pub mod mapper;
pub mod radio;
pub mod rigctl;

pub use band::{Band, BandStep, BandTable};
pub use bridge::{RadioSnapshot, StatusBridge};
pub use config::RigdialConfig;
pub use device::DeviceExit;
pub use mapper::{ControlMapper, RadioAction, StepPolicy};
pub use radio::{FlrigClient, RadioError, RadioLink};
pub use rigctl::StatusServer;
