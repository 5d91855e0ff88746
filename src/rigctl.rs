//! rigctld-style status responder
//!
//! Logging programs poll a rigctld daemon for the current frequency. This
//! server answers exactly one query, `+\get_vfo_info VFOA`, from the cached
//! [`RadioSnapshot`]. Any other line, including bytes that are not text, is
//! ignored and the connection stays open.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info, warn};

use crate::bridge::{RadioSnapshot, SnapshotReceiver};

/// Default bind address (the rigctld port)
pub const DEFAULT_BIND: &str = "127.0.0.1:4532";

/// The only query line the server answers
pub const VFO_INFO_QUERY: &str = "+\\get_vfo_info VFOA";

/// Longest line buffered per read; longer lines are skipped
const MAX_LINE_LEN: u64 = 256;

/// Format the extended-response block for a `get_vfo_info` query
pub fn format_vfo_info(snapshot: &RadioSnapshot) -> String {
    format!(
        "get_vfo_info: VFOA\nFreq: {}\nMode: {}\nSplit: {}\nRPRT 0\n",
        snapshot.vfo_hz, snapshot.mode, snapshot.split
    )
}

/// Bound status server
pub struct StatusServer {
    listener: TcpListener,
    snapshots: SnapshotReceiver,
}

impl StatusServer {
    /// Bind the listener
    pub async fn bind(addr: impl ToSocketAddrs, snapshots: SnapshotReceiver) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            snapshots,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, one task per connection
    pub async fn serve(self) -> io::Result<()> {
        info!("Status server listening on {}", self.listener.local_addr()?);
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!("Status client connected from {}", peer);
            let snapshots = self.snapshots.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, snapshots).await {
                    warn!("Status client {} error: {}", peer, e);
                }
                debug!("Status client {} disconnected", peer);
            });
        }
    }
}

async fn handle_connection(stream: TcpStream, snapshots: SnapshotReceiver) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    // Set while skipping the rest of an overlong line
    let mut skipping = false;

    loop {
        line.clear();
        let n = (&mut reader)
            .take(MAX_LINE_LEN)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            return Ok(());
        }
        if line.last() != Some(&b'\n') {
            skipping = true;
            continue;
        }
        if std::mem::take(&mut skipping) {
            debug!("Ignoring overlong status query");
            continue;
        }

        if trim_line_end(&line) != VFO_INFO_QUERY.as_bytes() {
            debug!("Ignoring status query {:?}", String::from_utf8_lossy(&line));
            continue;
        }
        // Clone before awaiting; the watch borrow must not be held
        let snapshot = snapshots.borrow().clone();
        writer.write_all(format_vfo_info(&snapshot).as_bytes()).await?;
        writer.flush().await?;
    }
}

/// Strip a trailing `\n` or `\r\n`
fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
