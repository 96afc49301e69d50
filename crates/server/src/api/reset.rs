use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use nemia_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

const INVALID_SESSION: &str = "Invalid session ID";

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
  pub session_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ResetResponse {
  pub message: String,
}

/// Clear a session's history while keeping its name and facts
#[utoipa::path(
  post,
  path = "/reset",
  request_body = ResetRequest,
  responses(
    (status = 200, description = "History cleared", body = ResetResponse),
    (status = 400, description = "Missing or unknown sessionId")
  )
)]
#[axum::debug_handler]
pub async fn reset(
  State(state): State<AppState>,
  payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Result<Json<ResetResponse>, AppError> {
  let Json(payload) = payload.map_err(|err| {
    AppError::with_status(StatusCode::BAD_REQUEST, err).with_public_message(INVALID_SESSION)
  })?;

  let session_id = payload
    .session_id
    .filter(|id| !id.is_empty())
    .ok_or_else(|| AppError::public(StatusCode::BAD_REQUEST, INVALID_SESSION))?;

  state.companion.reset(&session_id).await.map_err(|err| {
    AppError::with_status(StatusCode::BAD_REQUEST, err).with_public_message(INVALID_SESSION)
  })?;

  Ok(Json(ResetResponse {
    message: "Session reset but user info kept.".to_owned(),
  }))
}
