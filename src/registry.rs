//! Registry of active sessions
//!
//! Owns the two membership invariants: at most `capacity` sessions, and no
//! two sessions with the same display name. Every check-and-commit happens
//! inside a single `&mut self` call, so callers that serialize access (the
//! server actor) can never interleave two registrations of one name.
//! Nothing here performs I/O.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::client::Client;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::types::SessionId;

/// Maximum number of simultaneously registered sessions
pub const MAX_SESSIONS: usize = 10;

/// Active sessions keyed by handle
#[derive(Debug)]
pub struct Registry {
    clients: HashMap<SessionId, Client>,
    capacity: usize,
}

impl Registry {
    /// Create an empty registry with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }

    /// Create an empty registry holding at most `capacity` sessions
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clients: HashMap::new(),
            capacity,
        }
    }

    /// Register a client under its proposed name
    ///
    /// Capacity is checked before the name, so a full server never keeps a
    /// peer looping on name prompts.
    pub fn try_register(&mut self, client: Client) -> Result<(), AppError> {
        if self.clients.len() >= self.capacity {
            return Err(AppError::CapacityExceeded);
        }
        if self.is_name_taken(&client.name) {
            return Err(AppError::NameTaken(client.name));
        }
        self.clients.insert(client.id, client);
        Ok(())
    }

    /// Check whether any registered session currently uses `name`
    ///
    /// Exact, case-sensitive comparison.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.clients.values().any(|c| c.name == name)
    }

    /// Rebind a session's name, returning the old one
    pub fn rename(&mut self, id: SessionId, new_name: &str) -> Result<String, AppError> {
        if self.is_name_taken(new_name) {
            return Err(AppError::NameTaken(new_name.to_string()));
        }
        let Some(client) = self.clients.get_mut(&id) else {
            return Err(AppError::NotRegistered);
        };
        Ok(std::mem::replace(&mut client.name, new_name.to_string()))
    }

    /// Remove a session
    ///
    /// Returns the removed record, or None if it was not registered
    /// (a repeated call is a no-op).
    pub fn deregister(&mut self, id: SessionId) -> Option<Client> {
        self.clients.remove(&id)
    }

    /// Outbound channels of every registered session
    pub fn snapshot(&self) -> Vec<mpsc::Sender<ServerMessage>> {
        self.clients.values().map(|c| c.sender.clone()).collect()
    }

    /// Look up a registered session
    pub fn get(&self, id: SessionId) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
