//! Per-connection session
//!
//! Runs the name handshake, then turns inbound lines into chat messages
//! and rename requests for the ChatServer. Outbound traffic goes through a
//! channel drained by a dedicated writer task, so the server never touches
//! the socket directly.
//!
//! Lines are framed as raw bytes and decoded lossily, so a client sending
//! non-UTF-8 text stays connected.

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{AnyDelimiterCodec, FramedRead};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::message::{ClientLine, ServerMessage};
use crate::server::ServerHandle;
use crate::types::SessionId;
use crate::validate::{normalize_join_name, validate_rename};

/// Outbound queue depth per session
pub const OUTBOUND_BUFFER_SIZE: usize = 32;

/// Longest accepted inbound line, in bytes
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

pub const WELCOME_PROMPT: &str = "Welcome to TCP-Chat!\n[ENTER YOUR NAME]: ";

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingName,
    Active,
    Closed,
}

/// Handle a newly accepted TCP connection
///
/// Returns once the peer is gone and every queued line has been written.
pub async fn handle_connection(stream: TcpStream, server: ServerHandle) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, write_half) = stream.into_split();
    let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
    let write_task = tokio::spawn(write_loop(write_half, outbound_rx));

    let mut session = Session::new(read_half, outbound, server);
    info!("Client {} connected from {}", session.id, peer_addr);

    let result = session.run().await;
    let client_id = session.id;
    // Dropping the session deregisters it and releases its sender; the
    // writer stops once the server has dropped its copy too.
    drop(session);
    let _ = write_task.await;

    info!("Client {} disconnected", client_id);

    match result {
        Err(AppError::CapacityExceeded) => {
            warn!("Maximum number of clients reached, rejected {}", peer_addr);
            Ok(())
        }
        other => other,
    }
}

/// Drain the outbound queue into the socket
async fn write_loop(mut writer: OwnedWriteHalf, mut outbound: mpsc::Receiver<ServerMessage>) {
    while let Some(msg) = outbound.recv().await {
        if let Err(e) = writer.write_all(msg.to_wire().as_bytes()).await {
            debug!("Socket write failed, ending write task: {}", e);
            break;
        }
    }
    let _ = writer.shutdown().await;
}

/// Server-side state of one connection
struct Session {
    id: SessionId,
    state: SessionState,
    lines: FramedRead<OwnedReadHalf, AnyDelimiterCodec>,
    outbound: mpsc::Sender<ServerMessage>,
    server: ServerHandle,
}

impl Session {
    fn new(
        read_half: OwnedReadHalf,
        outbound: mpsc::Sender<ServerMessage>,
        server: ServerHandle,
    ) -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Connecting,
            lines: FramedRead::new(
                read_half,
                AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), MAX_LINE_LENGTH),
            ),
            outbound,
            server,
        }
    }

    /// Drive the session until the peer leaves
    async fn run(&mut self) -> Result<(), AppError> {
        self.notice(WELCOME_PROMPT).await?;
        self.state = SessionState::AwaitingName;

        if !self.await_name().await? {
            debug!("Client {} left during handshake", self.id);
            return Ok(());
        }
        self.state = SessionState::Active;

        self.read_loop().await
    }

    /// Read names until one registers
    ///
    /// Returns false if the peer closed the connection first.
    async fn await_name(&mut self) -> Result<bool, AppError> {
        loop {
            let Some(line) = self.next_line().await? else {
                return Ok(false);
            };
            let name = normalize_join_name(&line);

            match self
                .server
                .register(self.id, name, self.outbound.clone())
                .await
            {
                Ok(()) => return Ok(true),
                Err(AppError::NameTaken(name)) => {
                    self.notice(format!(
                        "Username {} is already taken. Please choose another.\n[ENTER ANOTHER NAME]: ",
                        name
                    ))
                    .await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Forward chat lines and commands until the stream ends
    async fn read_loop(&mut self) -> Result<(), AppError> {
        while let Some(line) = self.next_line().await? {
            match ClientLine::parse(&line) {
                None => continue,
                Some(ClientLine::Rename(target)) => self.rename(&target).await?,
                Some(ClientLine::Chat(text)) => self.server.chat(self.id, text).await?,
            }
        }
        Ok(())
    }

    /// Read the next line, replacing invalid UTF-8
    ///
    /// Returns None at end of stream. The trailing `\r` of CRLF clients is
    /// left in place; every consumer trims.
    async fn next_line(&mut self) -> Result<Option<String>, AppError> {
        match self.lines.next().await {
            Some(chunk) => Ok(Some(String::from_utf8_lossy(&chunk?).into_owned())),
            None => Ok(None),
        }
    }

    /// Validate and apply a `/name` request
    ///
    /// Validation failures are reported to this client only.
    async fn rename(&mut self, target: &str) -> Result<(), AppError> {
        let result = match validate_rename(target) {
            Ok(new_name) => self.server.rename(self.id, new_name).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => match e.client_notice() {
                Some(text) => {
                    debug!("Client {} rename rejected: {}", self.id, e);
                    self.notice(text).await
                }
                None => Err(e),
            },
        }
    }

    /// Queue text for this client only
    async fn notice(&self, text: impl Into<String>) -> Result<(), AppError> {
        self.outbound
            .send(ServerMessage::Notice(text.into()))
            .await
            .map_err(|_| AppError::ChannelSend)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            self.server.disconnect_now(self.id);
        }
        self.state = SessionState::Closed;
    }
}
