//! TCP Chat Relay - Entry Point
//!
//! Opens the transcript, starts the TCP listener and ChatServer actor,
//! and accepts connections.

use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tcp_chat::{serve, ChatServer, Config, Transcript};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=tcp_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tcp_chat=info")),
        )
        .init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let transcript = Transcript::open(&config.transcript_path).await?;
    info!("Appending transcript to {}", config.transcript_path.display());

    // Start TCP listener
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("Listening on the port :{}", config.listen_addr.port());

    let (server, handle) = ChatServer::new(transcript);
    tokio::spawn(server.run());

    serve(listener, handle).await;
    Ok(())
}
