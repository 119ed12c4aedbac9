// Core module - Session logic
pub mod session;
