//! Periodic radio status cache
//!
//! The [`StatusBridge`] polls the radio on a fixed period and publishes the
//! result through a watch channel. Query handlers only ever read the latest
//! published [`RadioSnapshot`]; they never wait on the radio.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::radio::{RadioError, RadioLink};

/// Poll period for the status cache
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Last known radio state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadioSnapshot {
    pub vfo_hz: u64,
    pub mode: String,
    pub split: i32,
}

impl RadioSnapshot {
    /// Read a fresh snapshot from the radio (three remote calls)
    pub fn read_from(link: &dyn RadioLink) -> Result<Self, RadioError> {
        Ok(Self {
            vfo_hz: link.get_vfo()?,
            mode: link.get_mode()?,
            split: link.get_split()?,
        })
    }
}

/// Receiving side of the snapshot cache
pub type SnapshotReceiver = watch::Receiver<RadioSnapshot>;

/// Poller that keeps the snapshot cache fresh
pub struct StatusBridge {
    link: Arc<dyn RadioLink>,
    tx: watch::Sender<RadioSnapshot>,
}

impl StatusBridge {
    /// Create a bridge with an empty snapshot
    pub fn new(link: Arc<dyn RadioLink>) -> Self {
        let (tx, _) = watch::channel(RadioSnapshot::default());
        Self { link, tx }
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> RadioSnapshot {
        self.tx.borrow().clone()
    }

    /// Poll the radio once and overwrite the cache (blocking)
    pub fn poll_once(&self) -> Result<(), RadioError> {
        let snapshot = RadioSnapshot::read_from(self.link.as_ref())?;
        debug!(?snapshot, "status poll");
        self.tx.send_replace(snapshot);
        Ok(())
    }

    /// Poll every `period` until the task is dropped.
    ///
    /// Remote reads run on the blocking pool. A failed poll keeps the
    /// previous snapshot. A poll that overruns the period pushes the
    /// schedule back instead of triggering catch-up polls.
    pub async fn run(self: Arc<Self>, period: Duration) {
        let mut interval = poll_interval(period);

        loop {
            interval.tick().await;
            let bridge = Arc::clone(&self);
            match tokio::task::spawn_blocking(move || bridge.poll_once()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Status poll failed: {}", e),
                Err(e) => warn!("Status poll task failed: {}", e),
            }
        }
    }
}

/// Ticker for the poll loop; missed ticks are delayed, never burst
fn poll_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
