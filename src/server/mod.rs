// Server module entry
// Process pool, listener, connection handling and shutdown

pub mod connection;
pub mod listener;
pub mod signal;
pub mod supervisor;

// Rust does not allow `loop` as a module name (keyword)
#[path = "loop.rs"]
pub mod server_loop;

pub use supervisor::run;
