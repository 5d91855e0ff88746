//! Status server answering rigctld-style queries from the snapshot cache

use std::time::Duration;

use rigdial::bridge::RadioSnapshot;
use rigdial::rigctl::StatusServer;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;

const EXPECTED: &str = "get_vfo_info: VFOA\nFreq: 14074000\nMode: USB-D\nSplit: 0\nRPRT 0\n";

async fn start(snapshot: RadioSnapshot) -> (std::net::SocketAddr, watch::Sender<RadioSnapshot>) {
    let (tx, rx) = watch::channel(snapshot);
    let server = StatusServer::bind("127.0.0.1:0", rx).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    (addr, tx)
}

/// Read one five-line reply
async fn read_reply<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> String {
    let mut reply = String::new();
    for _ in 0..5 {
        tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut reply))
            .await
            .expect("reply timed out")
            .unwrap();
    }
    reply
}

fn ft8_20m() -> RadioSnapshot {
    RadioSnapshot {
        vfo_hz: 14_074_000,
        mode: "USB-D".into(),
        split: 0,
    }
}

#[tokio::test]
async fn test_query_gets_exact_reply() {
    let (addr, _tx) = start(ft8_20m()).await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();
    assert_eq!(read_reply(&mut reader).await, EXPECTED);
}

#[tokio::test]
async fn test_other_input_ignored_connection_stays_open() {
    let (addr, _tx) = start(ft8_20m()).await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer
        .write_all(b"f\n\\dump_state\n+\\get_vfo_info VFOB\n+\\get_vfo_info VFOA\r\n")
        .await
        .unwrap();
    // Only the last line is answered
    assert_eq!(read_reply(&mut reader).await, EXPECTED);

    writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();
    assert_eq!(read_reply(&mut reader).await, EXPECTED);
}

#[tokio::test]
async fn test_binary_garbage_keeps_connection_open() {
    let (addr, _tx) = start(ft8_20m()).await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(b"\xff\xfe junk\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();
    assert_eq!(read_reply(&mut reader).await, EXPECTED);
}

#[tokio::test]
async fn test_overlong_line_skipped() {
    let (addr, _tx) = start(ft8_20m()).await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    // A long line ending in the query text is still not the query
    let mut long = vec![b'x'; 10_000];
    long.extend_from_slice(b"+\\get_vfo_info VFOA\n");
    writer.write_all(&long).await.unwrap();
    writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();

    assert_eq!(read_reply(&mut reader).await, EXPECTED);
    // Nothing else was answered
    let mut extra = String::new();
    let more = tokio::time::timeout(Duration::from_millis(200), reader.read_line(&mut extra)).await;
    assert!(more.is_err(), "unexpected reply {extra:?}");
}

#[tokio::test]
async fn test_reply_follows_latest_snapshot() {
    let (addr, tx) = start(RadioSnapshot::default()).await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();
    assert_eq!(
        read_reply(&mut reader).await,
        "get_vfo_info: VFOA\nFreq: 0\nMode: \nSplit: 0\nRPRT 0\n"
    );

    tx.send_replace(RadioSnapshot {
        vfo_hz: 7_074_000,
        mode: "LSB".into(),
        split: 1,
    });
    writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();
    assert_eq!(
        read_reply(&mut reader).await,
        "get_vfo_info: VFOA\nFreq: 7074000\nMode: LSB\nSplit: 1\nRPRT 0\n"
    );
}

#[tokio::test]
async fn test_concurrent_clients() {
    let (addr, _tx) = start(ft8_20m()).await;

    let mut tasks = Vec::new();
    for _ in 0..4 {
        tasks.push(tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            writer.write_all(b"+\\get_vfo_info VFOA\n").await.unwrap();
            read_reply(&mut reader).await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), EXPECTED);
    }
}
