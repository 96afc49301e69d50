use std::{
  backtrace::{Backtrace, BacktraceStatus},
  fmt::Display,
};

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;

const GENERIC_MESSAGE: &str = "Something went wrong.";

/// Error returned from HTTP handlers.
///
/// The wrapped error is only ever logged. Callers see `public_message`, or the
/// error text itself for client errors raised without one.
#[derive(Debug)]
pub struct AppError {
  err: anyhow::Error,
  status_code: StatusCode,
  public_message: Option<String>,
}

impl AppError {
  /// Create with 500 status
  pub fn new<E: Into<anyhow::Error>>(err: E) -> Self {
    Self {
      err: err.into(),
      status_code: StatusCode::INTERNAL_SERVER_ERROR,
      public_message: None,
    }
  }

  /// Create with custom status
  pub fn with_status<E: Into<anyhow::Error>>(status: StatusCode, err: E) -> Self {
    Self {
      err: err.into(),
      status_code: status,
      public_message: None,
    }
  }

  /// Client-facing error whose message is safe to return verbatim.
  pub fn public(status: StatusCode, message: impl Into<String>) -> Self {
    let message = message.into();
    Self {
      err: anyhow::anyhow!(message.clone()),
      status_code: status,
      public_message: Some(message),
    }
  }

  #[must_use]
  pub fn with_public_message(mut self, message: impl Into<String>) -> Self {
    self.public_message = Some(message.into());
    self
  }

  #[must_use]
  pub const fn status_code(&self) -> StatusCode {
    self.status_code
  }

  /// Message placed in the `error` field of the response body.
  #[must_use]
  pub fn public_message(&self) -> String {
    match &self.public_message {
      Some(message) => message.clone(),
      None if self.status_code.is_client_error() => self.err.to_string(),
      None => GENERIC_MESSAGE.to_owned(),
    }
  }

  /// Get backtrace from anyhow (requires `RUST_BACKTRACE=1` to capture)
  pub fn backtrace(&self) -> &Backtrace {
    self.err.backtrace()
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    if self.status_code.is_server_error() {
      let bt = self.err.backtrace();
      if bt.status() == BacktraceStatus::Captured {
        tracing::error!(status = %self.status_code, "{:#}\nBacktrace:\n{}", self.err, bt);
      } else {
        tracing::error!(status = %self.status_code, "{:#}", self.err);
      }
    } else {
      tracing::debug!(status = %self.status_code, "{:#}", self.err);
    }

    let body = Json(json!({ "error": self.public_message() }));
    (self.status_code, body).into_response()
  }
}

impl Display for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.status_code, self.err)
  }
}

impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self::new(err)
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn server_errors_hide_details() {
    let err = AppError::new(anyhow::anyhow!("connection refused to 10.0.0.3"));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.public_message(), GENERIC_MESSAGE);
  }

  #[test]
  fn public_message_overrides_details() {
    let err = AppError::new(anyhow::anyhow!("upstream 503")).with_public_message("try later");
    assert_eq!(err.public_message(), "try later");
  }

  #[test]
  fn client_errors_show_their_text() {
    let err = AppError::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!("bad field"));
    assert_eq!(err.public_message(), "bad field");
    assert_eq!(err.to_string(), "[400 Bad Request] bad field");
  }

  #[tokio::test]
  async fn response_body_is_json_error() {
    let response = AppError::public(StatusCode::BAD_REQUEST, "Invalid session ID").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Invalid session ID" }));
  }
}
