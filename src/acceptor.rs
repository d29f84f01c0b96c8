//! Connection accept loop
//!
//! Spawns one session task per connection. While the registry is full,
//! new connections are accepted and closed straight away. The count read
//! here can be stale; the registry's own check is the one that holds.

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::registry::MAX_SESSIONS;
use crate::server::ServerHandle;
use crate::session::handle_connection;

/// Accept connections forever
pub async fn serve(listener: TcpListener, server: ServerHandle) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if server.active_sessions() >= MAX_SESSIONS {
                    warn!("Server is full, closing connection from {}", addr);
                    drop(stream);
                    continue;
                }

                info!("New connection from {}", addr);
                let server = server.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, server).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
