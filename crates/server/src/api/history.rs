use axum::{
  Json,
  extract::{Path, State},
};
use nemia_shared::Turn;
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::AppState;

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
  pub history: Vec<Turn>,
}

/// Conversation history of a session; empty for unknown sessions
#[utoipa::path(
  get,
  path = "/history/{session_id}",
  params(("session_id" = String, Path, description = "Session identifier")),
  responses(
    (status = 200, description = "Turns in conversation order", body = HistoryResponse),
  )
)]
#[axum::debug_handler]
pub async fn history(
  State(state): State<AppState>,
  Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
  let history = state
    .companion
    .history(&session_id)
    .await
    .unwrap_or_default();

  Json(HistoryResponse { history })
}
