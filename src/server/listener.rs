use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::Connection;
use crate::server::ServerContext;

pub async fn run(listen_addr: &str, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!("Listening on {}", listen_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        let ctx = ctx.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket);
            if let Err(e) = conn.run(&ctx).await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
