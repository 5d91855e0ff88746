//! Per-device reader threads
//!
//! Each bound controller gets a dedicated OS thread that blocks on the next
//! report, derives events and maps them onto the radio before reading the
//! following report.

use std::io;
use std::thread::JoinHandle;
use std::time::Instant;

use rigdial_transport::{InputEventEngine, ReportSource, TransportError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::mapper::ControlMapper;

/// Notification that a device reader stopped for good
#[derive(Debug)]
pub struct DeviceExit {
    /// Device label
    pub device: String,
    /// Why it stopped
    pub error: TransportError,
}

/// Read, decode and map reports until the source fails.
///
/// Radio errors are logged and the offending action dropped. Returns the
/// transport error that ended the loop.
pub fn run_report_loop(source: &mut dyn ReportSource, mapper: &mut ControlMapper) -> TransportError {
    let mut engine = InputEventEngine::new();
    let start = Instant::now();
    info!("Reading reports from {}", source.label());

    loop {
        let report = match source.next_report() {
            Ok(report) => report,
            Err(e) => return e,
        };
        let now_ms = start.elapsed().as_millis() as u64;

        for event in engine.process(&report, now_ms) {
            match mapper.handle(&event) {
                Ok(Some(action)) => debug!(?action, "radio updated"),
                Ok(None) => {}
                Err(e) => warn!("Dropped {:?}: {}", event, e),
            }
        }
    }
}

/// Spawn a named reader thread for one device.
///
/// When the device goes away the thread sends a [`DeviceExit`] to `exits`
/// and ends.
pub fn spawn_reader(
    mut source: Box<dyn ReportSource>,
    mut mapper: ControlMapper,
    exits: mpsc::UnboundedSender<DeviceExit>,
) -> io::Result<JoinHandle<()>> {
    let device = source.label().to_string();
    std::thread::Builder::new()
        .name(format!("{device}-reader"))
        .spawn(move || {
            let error = run_report_loop(source.as_mut(), &mut mapper);
            error!("{} stopped: {}", device, error);
            let _ = exits.send(DeviceExit { device, error });
        })
}
