//! Startup configuration from process arguments

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::transcript::DEFAULT_TRANSCRIPT_PATH;

/// Port used when none is given
pub const DEFAULT_PORT: u16 = 8989;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// More than one argument
    #[error("[USAGE]: ./TCPChat $port")]
    Usage,
    /// Argument is not a valid TCP port
    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to listen on (all interfaces)
    pub listen_addr: SocketAddr,
    /// Transcript file, opened in append mode
    pub transcript_path: PathBuf,
}

impl Config {
    /// Build from the arguments following the program name
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let port = match (args.next(), args.next()) {
            (None, _) => DEFAULT_PORT,
            (Some(port), None) => port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port))?,
            (Some(_), Some(_)) => return Err(ConfigError::Usage),
        };

        Ok(Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            transcript_path: PathBuf::from(DEFAULT_TRANSCRIPT_PATH),
        })
    }
}
