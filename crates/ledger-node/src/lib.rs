pub mod config;
mod constants;
pub mod error;
pub mod mining;
pub mod peers;
pub mod routes;
pub mod state;
pub mod transport;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{Args, NodeConfig};
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/healthz", get(routes::health))
        .route("/mine", get(routes::mine))
        .route("/transactions/new", post(routes::new_transaction))
        .route("/transactions/pending", get(routes::pending))
        .route("/chain", get(routes::chain))
        .route("/chain/head", get(routes::head))
        .route("/chain/valid", get(routes::validate))
        .route("/nodes", get(routes::list_nodes))
        .route("/nodes/register", post(routes::register_nodes))
        .route("/nodes/resolve", get(routes::resolve_conflicts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
