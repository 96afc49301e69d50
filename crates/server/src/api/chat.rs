use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use nemia_shared::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::AppState;

const DEFAULT_SESSION_ID: &str = "default";
const INVALID_REQUEST: &str = "Message and valid sessionId are required.";

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
  /// What the user said. Rejected with 400 when missing, empty or only
  /// whitespace.
  pub message: Option<String>,
  /// Conversation to continue, `"default"` when omitted
  pub session_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
  pub reply: String,
}

/// Send a message and get the companion's reply
#[utoipa::path(
  post,
  path = "/chat",
  request_body = ChatRequest,
  responses(
    (status = 200, description = "Generated reply", body = ChatResponse),
    (status = 400, description = "Message missing or sessionId not a string"),
    (status = 500, description = "Completion service failed")
  )
)]
#[axum::debug_handler]
pub async fn chat(
  State(state): State<AppState>,
  payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
  let Json(payload) = payload.map_err(|err| {
    AppError::with_status(StatusCode::BAD_REQUEST, err).with_public_message(INVALID_REQUEST)
  })?;

  let message = payload
    .message
    .filter(|m| !m.trim().is_empty())
    .ok_or_else(|| AppError::public(StatusCode::BAD_REQUEST, INVALID_REQUEST))?;
  let session_id = payload
    .session_id
    .filter(|id| !id.is_empty())
    .unwrap_or_else(|| DEFAULT_SESSION_ID.to_owned());

  let reply = state
    .companion
    .chat(&session_id, &message)
    .await
    .map_err(|err| {
      AppError::new(err).with_public_message(format!(
        "Oops! {} had a little hiccup. Try again soon",
        state.companion.persona()
      ))
    })?;

  Ok(Json(ChatResponse { reply }))
}
