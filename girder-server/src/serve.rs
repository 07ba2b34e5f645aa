use axum::Router;
use girder_core::settings::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

/// HTTP server bound to a [`ServerConfig`] address.
pub struct Server {
    config: ServerConfig,
    router: Router,
}

impl Server {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self { config, router }
    }

    /// Bind the listener and serve until the returned handle is shut down.
    pub async fn start(self) -> anyhow::Result<ServerHandle> {
        let listener = TcpListener::bind(self.config.addr()).await?;
        let addr = listener.local_addr()?;
        info!(addr = %addr, "Starting server");

        let shutdown = Arc::new(Notify::new());
        let signal = shutdown.clone();
        let router = self.router;
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await
                .map_err(anyhow::Error::from)
        });

        Ok(ServerHandle {
            addr,
            shutdown,
            task,
        })
    }
}

/// Handle to a running server; dropping it does not stop the server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl ServerHandle {
    /// The bound address, useful when the config asked for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections, drain in-flight requests, and wait for exit.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!(addr = %self.addr, "Shutting down server");
        self.shutdown.notify_one();
        self.task.await??;
        Ok(())
    }
}
