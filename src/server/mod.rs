//! Server core functionality
//!
//! Binds the HTTP listener and serves the file explorer API.

pub mod core;

pub use self::core::Server;
