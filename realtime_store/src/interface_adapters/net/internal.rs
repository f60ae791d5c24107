// Administrative REST routes over the value tree.
// These are how operators seed data no game client produces (e.g. the `enemies` roster).

use crate::interface_adapters::http::PushResponse;
use crate::interface_adapters::state::AppState;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub async fn read_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> impl IntoResponse {
    match state.hub.get(&path) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn write_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Json(value): Json<Value>,
) -> impl IntoResponse {
    match state.hub.set(&path, value) {
        Ok(()) => {
            info!(%path, "value written over http");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn push_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Json(value): Json<Value>,
) -> impl IntoResponse {
    match state.hub.push(&path, value) {
        Ok(key) => (StatusCode::CREATED, Json(PushResponse { key })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> impl IntoResponse {
    match state.hub.remove(&path) {
        Ok(removed) => {
            info!(%path, removed, "value removed over http");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}
