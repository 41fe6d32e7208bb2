use std::sync::Arc;

use noderelay::config::Config;
use noderelay::proxy::dial::NetDialer;
use noderelay::proxy::relay::RelayHandler;
use noderelay::registry::InstanceRegistry;
use noderelay::routing::Router;
use noderelay::server::{self, ServerContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let registry = InstanceRegistry::new(cfg.instances.clone());
    let router = Router::new(&cfg.routes)?;
    let relay = RelayHandler::new(registry, NetDialer::new(), cfg.port_number.clone());
    let ctx = Arc::new(ServerContext { router, relay });

    tokio::select! {
        res = server::listener::run(&cfg.listen_addr, ctx) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
