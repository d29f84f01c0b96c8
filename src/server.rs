//! ChatServer Actor implementation
//!
//! The central actor that owns all shared state: the session registry, the
//! message history and the transcript. Sessions talk to it through a
//! `ServerHandle`; commands are handled one at a time, which makes every
//! registry change and every broadcast (dedup check, append, transcript
//! write and fan-out) atomic with respect to all others.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::client::Client;
use crate::error::AppError;
use crate::message::{Message, ServerMessage};
use crate::registry::Registry;
use crate::store::MessageStore;
use crate::transcript::Transcript;
use crate::types::SessionId;

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Reply channel for commands that can fail
pub type Reply = oneshot::Sender<Result<(), AppError>>;

/// Commands sent from sessions to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Finish the handshake under `name`
    Register {
        client_id: SessionId,
        name: String,
        sender: mpsc::Sender<ServerMessage>,
        reply: Reply,
    },
    /// Change an active session's name (already validated)
    Rename {
        client_id: SessionId,
        new_name: String,
        reply: Reply,
    },
    /// Broadcast user text under the session's current name
    Chat {
        client_id: SessionId,
        text: String,
    },
    /// Session closed
    Disconnect {
        client_id: SessionId,
    },
}

/// Cloneable handle used by sessions and the acceptor
#[derive(Debug, Clone)]
pub struct ServerHandle {
    commands: mpsc::Sender<ServerCommand>,
    active: Arc<AtomicUsize>,
}

impl ServerHandle {
    async fn request(&self, build: impl FnOnce(Reply) -> ServerCommand) -> Result<(), AppError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| AppError::ChannelSend)?;
        response.await.map_err(|_| AppError::ChannelSend)?
    }

    /// Register a session
    ///
    /// On success the join has been broadcast and history replayed to
    /// `sender` by the time this returns.
    pub async fn register(
        &self,
        client_id: SessionId,
        name: String,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<(), AppError> {
        self.request(|reply| ServerCommand::Register {
            client_id,
            name,
            sender,
            reply,
        })
        .await
    }

    /// Rename a registered session
    pub async fn rename(&self, client_id: SessionId, new_name: String) -> Result<(), AppError> {
        self.request(|reply| ServerCommand::Rename {
            client_id,
            new_name,
            reply,
        })
        .await
    }

    /// Submit user text for broadcast
    pub async fn chat(&self, client_id: SessionId, text: String) -> Result<(), AppError> {
        self.commands
            .send(ServerCommand::Chat { client_id, text })
            .await
            .map_err(|_| AppError::ChannelSend)
    }

    /// Deregister a session and wait for the command to be queued
    #[cfg(test)]
    async fn disconnect(&self, client_id: SessionId) {
        let _ = self
            .commands
            .send(ServerCommand::Disconnect { client_id })
            .await;
    }

    /// Deregister without waiting, for use from `Drop`
    ///
    /// Falls back to a spawned send when the command queue is full.
    pub fn disconnect_now(&self, client_id: SessionId) {
        let cmd = ServerCommand::Disconnect { client_id };
        if let Err(mpsc::error::TrySendError::Full(cmd)) = self.commands.try_send(cmd) {
            let commands = self.commands.clone();
            tokio::spawn(async move {
                let _ = commands.send(cmd).await;
            });
        }
    }

    /// Registered session count, read without going through the actor
    ///
    /// May be momentarily stale.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

/// The main ChatServer actor
pub struct ChatServer {
    registry: Registry,
    store: MessageStore,
    transcript: Transcript,
    /// Mirror of `registry.len()` for the acceptor
    active: Arc<AtomicUsize>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer and the handle used to reach it
    pub fn new(transcript: Transcript) -> (Self, ServerHandle) {
        let (commands, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let active = Arc::new(AtomicUsize::new(0));
        let handle = ServerHandle {
            commands,
            active: Arc::clone(&active),
        };
        let server = Self {
            registry: Registry::new(),
            store: MessageStore::new(),
            transcript,
            active,
            receiver,
        };
        (server, handle)
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all handles are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Register {
                client_id,
                name,
                sender,
                reply,
            } => {
                let result = self.handle_register(client_id, name, sender).await;
                let _ = reply.send(result);
            }
            ServerCommand::Rename {
                client_id,
                new_name,
                reply,
            } => {
                let result = self.handle_rename(client_id, new_name).await;
                let _ = reply.send(result);
            }
            ServerCommand::Chat { client_id, text } => {
                self.handle_chat(client_id, text).await;
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id).await;
            }
        }
    }

    /// Handle the end of a session's handshake
    async fn handle_register(
        &mut self,
        client_id: SessionId,
        name: String,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<(), AppError> {
        let client = Client::new(client_id, name.clone(), sender.clone());
        self.registry.try_register(client)?;
        self.publish_active();
        info!("Client {} registered as '{}'", client_id, name);

        let own_join = self.broadcast(Message::joined(&name)).await;

        for msg in self.store.replay(own_join) {
            if sender.send(ServerMessage::Broadcast(msg.clone())).await.is_err() {
                debug!("Client {} went away during history replay", client_id);
                break;
            }
        }
        Ok(())
    }

    /// Handle a validated rename request
    async fn handle_rename(&mut self, client_id: SessionId, new_name: String) -> Result<(), AppError> {
        let old_name = self.registry.rename(client_id, &new_name)?;
        info!("Client {} renamed '{}' -> '{}'", client_id, old_name, new_name);
        self.broadcast(Message::renamed(&old_name, &new_name)).await;
        Ok(())
    }

    /// Handle user text
    async fn handle_chat(&mut self, client_id: SessionId, text: String) {
        let Some(client) = self.registry.get(client_id) else {
            debug!("Dropping chat from unregistered client {}", client_id);
            return;
        };
        let msg = Message::text(&client.name, &text);
        self.broadcast(msg).await;
    }

    /// Handle client disconnection
    async fn handle_disconnect(&mut self, client_id: SessionId) {
        let Some(client) = self.registry.deregister(client_id) else {
            return;
        };
        self.publish_active();
        info!("Client {} ('{}') disconnected", client_id, client.name);
        debug!("Total clients: {}", self.registry.len());

        self.broadcast(Message::left(&client.name)).await;
    }

    /// Record a message and deliver it to every registered client
    ///
    /// Returns the message's position in the history, or None if it was
    /// dropped as an immediate duplicate.
    async fn broadcast(&mut self, msg: Message) -> Option<usize> {
        if self.store.is_immediate_duplicate(&msg) {
            debug!("Dropping duplicate message from '{}'", msg.sender);
            return None;
        }

        let index = self.store.append(msg.clone());
        self.transcript.append(&msg).await;

        for target in self.registry.snapshot() {
            // A closed channel means that session is on its way out
            let _ = target.send(ServerMessage::Broadcast(msg.clone())).await;
        }
        Some(index)
    }

    fn publish_active(&self) {
        self.active.store(self.registry.len(), Ordering::Relaxed);
    }
}
