use axum::{
  Json, Router,
  routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::utils::AppState;

mod chat;
mod github_user;
mod history;
mod reset;

pub use chat::{ChatRequest, ChatResponse};
pub use history::HistoryResponse;
pub use reset::{ResetRequest, ResetResponse};

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Nemia API",
    version = "0.0.1",
    description = "Companion chat backend with per-session memory"
  ),
  paths(
    chat::chat,
    history::history,
    reset::reset,
    github_user::github_user
  ),
  components(schemas(
    ChatRequest,
    ChatResponse,
    HistoryResponse,
    ResetRequest,
    ResetResponse,
    nemia_shared::Turn,
    nemia_shared::TurnRole,
  ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
  Json(ApiDoc::openapi())
}

pub fn app() -> Router<AppState> {
  Router::new()
    .route("/chat", post(chat::chat))
    .route("/history/{session_id}", get(history::history))
    .route("/reset", post(reset::reset))
    .route("/github-user/{username}", get(github_user::github_user))
    .route("/openapi.json", get(openapi_json))
    .merge(Scalar::with_url("/openapi/", ApiDoc::openapi()))
}
