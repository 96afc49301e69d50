use axum::{
  Json,
  extract::{Path, State},
  response::{IntoResponse, Response},
};
use nemia_shared::AppError;

use crate::utils::{AppState, GithubLookup};

const PROXY_FAILED: &str = "Something went wrong with GitHub API.";

/// Look up a GitHub user
#[utoipa::path(
  get,
  path = "/github-user/{username}",
  params(("username" = String, Path, description = "GitHub login")),
  responses(
    (status = 200, description = "GitHub user object, passed through unchanged"),
    (status = 500, description = "GitHub could not be reached")
  )
)]
#[axum::debug_handler]
pub async fn github_user(
  State(state): State<AppState>,
  Path(username): Path<String>,
) -> Result<Response, AppError> {
  let lookup = state
    .github
    .user(&username)
    .await
    .map_err(|err| AppError::new(err).with_public_message(PROXY_FAILED))?;

  match lookup {
    GithubLookup::Found(user) => Ok(Json(user).into_response()),
    GithubLookup::Failed { status, message } => Err(AppError::public(
      status,
      message.unwrap_or_else(|| format!("GitHub responded with {status}")),
    )),
  }
}
