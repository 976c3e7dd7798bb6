use super::local;
use super::protocol::{ENDPOINT_EXECUTE, ENDPOINT_HEALTH};
use super::registry::FunctionRegistry;
use super::types::*;

use axum::{Extension, Json, Router, http::StatusCode, routing::get, routing::post};
use std::sync::Arc;

/// Router serving a worker's execution API.
pub fn worker_router(registry: Arc<FunctionRegistry>) -> Router {
    Router::new()
        .route(ENDPOINT_EXECUTE, post(handle_execute))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(registry))
}

pub async fn handle_execute(
    Extension(registry): Extension<Arc<FunctionRegistry>>,
    Json(req): Json<ExecuteRequest>,
) -> (StatusCode, Json<ExecuteResponse>) {
    tracing::debug!(
        "Executing {} '{}' over {} element(s)",
        req.op,
        req.function,
        req.chunk.len()
    );

    if !registry.has_function(&req.function) {
        tracing::warn!("Unknown function requested: {}", req.function);
        return (
            StatusCode::NOT_FOUND,
            Json(ExecuteResponse::failed(format!(
                "Unknown function: {}",
                req.function
            ))),
        );
    }

    // Functions are synchronous and may be CPU heavy.
    let function = req.function.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        local::apply(&registry, req.op, &req.function, req.chunk)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => (StatusCode::OK, Json(ExecuteResponse::ok(result))),
        Ok(Err(e)) => {
            tracing::warn!("Function '{}' failed: {}", function, e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ExecuteResponse::failed(e.to_string())),
            )
        }
        Err(e) => {
            tracing::error!("Function '{}' panicked: {}", function, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExecuteResponse::failed(format!("function panicked: {}", e))),
            )
        }
    }
}

pub async fn handle_health() -> StatusCode {
    StatusCode::OK
}
