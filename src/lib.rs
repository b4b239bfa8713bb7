pub mod config;
pub mod error;
pub mod middleware;
pub mod navigate;
pub mod protocol;
pub mod search;
pub mod server;
pub mod storage;
pub mod transfer;

pub use config::ServerConfig;
pub use error::{ExplorerError, ServerError};
pub use server::Server;
