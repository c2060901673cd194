use clap::Parser;
use ledger_node::{app, AppState, Args, NodeConfig};
use std::net::SocketAddr;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = NodeConfig::from(&args);
    info!(node_id = %config.node_id, difficulty = config.difficulty, "starting ledger-node");

    let state = AppState::new(config)?;
    {
        let mut peers = state.peers.write().await;
        for peer in &args.peers {
            match peers.register(peer) {
                Ok(_) => info!(%peer, "registered startup peer"),
                Err(e) => warn!(%peer, error = %e, "ignoring startup peer"),
            }
        }
    }

    let addr: SocketAddr = args.listen.parse()?;
    info!("ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("ledger-node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
}
