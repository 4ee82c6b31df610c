//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use goishi_shared::protocol::{RoomData, RoomSummary};

use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Listed rooms with host statistics
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    Json(state.room_list_usecase.summaries().await)
}

pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomData>, StatusCode> {
    state
        .room_list_usecase
        .room_detail(&room_id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
