//! Integration test common infrastructure.
//!
//! Spawns an in-process relay on a loopback port and provides a line
//! client that can wait for prompts (which are not newline-terminated).

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tcp_chat::{serve, ChatServer, Transcript};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

pub const NAME_PROMPT: &str = "[ENTER YOUR NAME]: ";
pub const RETRY_PROMPT: &str = "[ENTER ANOTHER NAME]: ";

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Start a relay without a transcript
pub async fn spawn_server() -> SocketAddr {
    start(Transcript::disabled()).await
}

/// Start a relay writing its transcript to `path`
#[allow(dead_code)]
pub async fn spawn_server_with_transcript(path: &Path) -> SocketAddr {
    start(Transcript::open(path).await.expect("open transcript")).await
}

async fn start(transcript: Transcript) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (server, handle) = ChatServer::new(transcript);
    tokio::spawn(server.run());
    tokio::spawn(serve(listener, handle));
    addr
}

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Connect without completing the handshake.
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// Connect, answer the name prompt and consume the own join notice.
    pub async fn join(addr: SocketAddr, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.read_until(NAME_PROMPT).await;
        client.send_line(name).await;
        assert_eq!(
            client.recv_line().await,
            format!("{} has joined our chat...\n", name)
        );
        client
    }

    pub async fn send_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .expect("write");
    }

    /// Write bytes as-is, without appending a newline.
    #[allow(dead_code)]
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.expect("write");
    }

    /// Half-close: the server sees end of stream, replies can still be read.
    #[allow(dead_code)]
    pub async fn close_write(&mut self) {
        self.writer.shutdown().await.expect("shutdown");
    }

    /// Read one newline-terminated line.
    pub async fn recv_line(&mut self) -> String {
        let mut line = String::new();
        let n = timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .expect("read");
        assert!(n > 0, "connection closed while waiting for a line");
        line
    }

    /// Read until the received text ends with `suffix`.
    pub async fn read_until(&mut self, suffix: &str) -> String {
        let mut buf = Vec::new();
        timeout(READ_TIMEOUT, async {
            while !buf.ends_with(suffix.as_bytes()) {
                buf.push(self.reader.read_u8().await.expect("read"));
            }
        })
        .await
        .expect("timed out waiting for prompt");
        String::from_utf8(buf).expect("utf-8")
    }

    /// Skip lines until one equals `expected`.
    #[allow(dead_code)]
    pub async fn skip_until(&mut self, expected: &str) {
        while self.recv_line().await != expected {}
    }

    /// Assert the server closed the connection.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) {
        let mut line = String::new();
        let result = timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for close");
        match result {
            Ok(0) => {}
            Ok(_) => panic!("expected close, got {:?}", line),
            Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
        }
    }
}

/// Split a rendered chat line into (timestamp, rest)
#[allow(dead_code)]
pub fn split_timestamp(line: &str) -> (&str, &str) {
    assert!(line.starts_with('['), "not a timestamped line: {:?}", line);
    let (stamp, rest) = line[1..].split_at(19);
    assert!(rest.starts_with(']'), "not a timestamped line: {:?}", line);
    (stamp, &rest[1..])
}
