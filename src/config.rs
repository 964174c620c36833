//! Configuration Module
//!
//! Handles loading server configuration from environment variables.

use std::env;

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the line server listens on
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - TCP listen port (default: 6380)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6380),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { server_port: 6380 }
    }
}
