//! Multi-client TCP Chat Relay Library
//!
//! A line-oriented chat relay built on tokio: clients connect, pick a
//! unique display name and every line they send is fanned out to all
//! connected clients and appended to a transcript.
//!
//! # Features
//! - Name handshake with re-prompt on taken names
//! - `/name <newname>` renames (3 to 20 characters)
//! - History replay for newly joined clients
//! - Immediate-duplicate suppression
//! - At most 10 registered clients
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the registry, history and transcript
//! - Each connection runs a `session` task plus a writer task
//! - Commands are processed one at a time, so every client sees broadcasts
//!   in the same order they were recorded
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tcp_chat::{serve, ChatServer, Transcript};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("0.0.0.0:8989").await.unwrap();
//!     let transcript = Transcript::open("chat.log").await.unwrap();
//!     let (server, handle) = ChatServer::new(transcript);
//!
//!     tokio::spawn(server.run());
//!     serve(listener, handle).await;
//! }
//! ```

pub mod acceptor;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod store;
pub mod transcript;
pub mod types;
pub mod validate;

// Re-export main types for convenience
pub use acceptor::serve;
pub use client::Client;
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use message::{ClientLine, Message, MessageKind, ServerMessage};
pub use registry::{Registry, MAX_SESSIONS};
pub use server::{ChatServer, ServerCommand, ServerHandle};
pub use session::{handle_connection, SessionState};
pub use store::MessageStore;
pub use transcript::Transcript;
pub use types::SessionId;
