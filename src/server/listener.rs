use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::Connection;
use crate::http::handler::Handler;

/// Binds `listen_addr` and serves connections until an accept error.
pub async fn run(listen_addr: &str, handler: Arc<dyn Handler>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    serve(listener, handler).await
}

/// Accept loop; each connection runs on its own task.
pub async fn serve(listener: TcpListener, handler: Arc<dyn Handler>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, handler);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
