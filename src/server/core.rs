//! Server core
//!
//! Binds the HTTP listener over a sandbox root and serves the explorer API
//! until Ctrl-C.

use log::{error, info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::{AppState, router};
use crate::storage::SandboxRoot;
use crate::storage::filesystem::create_directory;

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: AppState,
}

impl Server {
    /// Prepares the sandbox root and binds the HTTP listener.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let root_path = config.server_root_path();
        if config.create_root_if_missing && !root_path.exists() {
            if let Err(e) = create_directory(&root_path) {
                warn!("Failed to create server root directory: {}", e);
            }
        }

        let root = SandboxRoot::new(&root_path)?;
        info!("Server root directory: {}", root.path().display());

        let socket = config.http_socket();
        let listener = TcpListener::bind(&socket).await.map_err(|source| {
            error!("Failed to bind to {}: {}", socket, source);
            ServerError::Bind {
                addr: socket.clone(),
                source,
            }
        })?;
        let local_addr = listener.local_addr()?;
        info!("Server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            state: AppState::new(root, config.upload_limits()),
        })
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until Ctrl-C.
    pub async fn start(self) -> Result<(), ServerError> {
        info!(
            "Starting RAX file explorer on http://{} (root {})",
            self.local_addr,
            self.state.root.path().display()
        );

        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
