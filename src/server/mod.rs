// Server module entry
// Listener creation, connection handling and the accept loop

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

pub use listener::create_listener;
pub use serve::serve;
pub use signal::start_signal_handler;
