//! Devterm Library
//!
//! Line-oriented TCP admin terminal: one connection, one command at a
//! time, each reply read as a single bounded chunk.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::session::{Session, SessionStats};
pub use crate::domain::config::{DecodeMode, DevtermConfig, EndpointConfig, SessionConfig};
pub use crate::domain::error::{DevtermError, DevtermResult};
pub use crate::infrastructure::tcp::{connect, EchoServer};
