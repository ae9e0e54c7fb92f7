use crate::engine::CompletionEngine;
use crate::handler::{self, InvocationEvent, InvocationResponse};
use axum::{extract::State, response::Json};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn CompletionEngine>,
}

/// Invocation endpoint. The HTTP layer always answers 200, as the platform's
/// invoke API does; the functional status code lives inside the payload.
pub async fn invoke(
    State(state): State<AppState>,
    Json(event): Json<InvocationEvent>,
) -> Json<InvocationResponse> {
    Json(handler::invoke(state.engine.as_ref(), event).await)
}
