pub mod handlers;

use crate::engine::{CompletionEngine, LlamaEngine};
use crate::{config::Config, Result};
use axum::{routing::post, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Path used by the AWS Lambda runtime interface emulator; kept alongside `/`
/// so local invocations match the deployed calling convention.
const RIE_INVOCATION_PATH: &str = "/2015-03-31/functions/function/invocations";

pub async fn run(config: Config) -> Result<()> {
    // Load the model before binding: a process that cannot load its weights
    // must never accept invocations.
    let engine = LlamaEngine::load(config.model.clone()).await?;

    let app = router(Arc::new(engine));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Listening for invocations on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(engine: Arc<dyn CompletionEngine>) -> Router {
    let state = handlers::AppState { engine };

    Router::new()
        .route("/", post(handlers::invoke))
        .route(RIE_INVOCATION_PATH, post(handlers::invoke))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
