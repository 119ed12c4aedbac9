// TCP module - TCP communication implementation
pub mod client;
pub mod server;

pub use client::connect;
pub use server::EchoServer;
