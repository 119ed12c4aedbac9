use crate::domain::error::{DevtermError, DevtermResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest reply chunk a single read may collect (1 MiB).
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Devterm configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevtermConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Remote device endpoint
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Interactive session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Remote endpoint the session connects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Applies to connection setup only, never to an exchange
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub no_delay: bool,
}

/// Session loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound of a single reply read
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Printed once after the connection is established
    #[serde(default = "default_hint")]
    pub hint: String,
    #[serde(default)]
    pub decode: DecodeMode,
}

/// How reply bytes become text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Invalid UTF-8 ends the session
    #[default]
    Strict,
    /// Invalid sequences become U+FFFD
    Lossy,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "ESP32_IP".to_string()
}

fn default_port() -> u16 {
    7777
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_buffer_size() -> usize {
    4096
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_hint() -> String {
    "Connected. Use AUTH <key>".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            no_delay: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            prompt: default_prompt(),
            hint: default_hint(),
            decode: DecodeMode::default(),
        }
    }
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl SessionConfig {
    /// The read buffer is allocated up front, so its size is bounded.
    pub fn validate(&self) -> DevtermResult<()> {
        if self.buffer_size == 0 || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(DevtermError::Config {
                message: format!(
                    "session.buffer_size must be between 1 and {} bytes, got {}",
                    MAX_BUFFER_SIZE, self.buffer_size
                ),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
