//! Client struct definition
//!
//! The registry's record of an active session: its handle, current
//! display name and outbound channel.

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::message::ServerMessage;
use crate::types::SessionId;

/// Registered session information
#[derive(Debug)]
pub struct Client {
    /// Session handle
    pub id: SessionId,
    /// Current display name, unique among registered clients
    pub name: String,
    /// Server → session writer channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// When the session completed its handshake
    pub joined_at: DateTime<Local>,
}

impl Client {
    /// Create a client record joining now
    pub fn new(id: SessionId, name: String, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            name,
            sender,
            joined_at: Local::now(),
        }
    }
}
