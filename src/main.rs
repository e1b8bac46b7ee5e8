use std::sync::Arc;

use anyhow::Context;
use local_metrics_proxy::config::Config;
use local_metrics_proxy::http::handler::Handler;
use local_metrics_proxy::registry::Registry;
use local_metrics_proxy::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();

    let registry = Registry::with_defaults();
    let chain = registry
        .load_chain_from_file(&cfg.handlers_path)
        .with_context(|| format!("loading handlers from {}", cfg.handlers_path.display()))?;
    tracing::info!(handlers = chain.len(), "Handler chain ready");
    let handler: Arc<dyn Handler> = Arc::new(chain);

    tokio::select! {
        res = server::listener::run(&cfg.listen_addr, handler) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
