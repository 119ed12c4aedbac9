// Session module - Interactive command/response loop
pub mod session;
pub mod state;

pub use session::Session;
pub use state::SessionStats;
