use std::path::Path;

use axum::{
  Router,
  extract::Request,
  middleware::{self, Next},
  response::Response,
};
use nemia_shared::AppError;
use tokio::net::TcpListener;
use tower_http::{
  cors::CorsLayer,
  services::{ServeDir, ServeFile},
};

use crate::{
  api,
  utils::{AppState, shutdown_signal},
};

async fn log_request(request: Request, next: Next) -> Response {
  tracing::info!(method = %request.method(), path = request.uri().path(), "incoming request");
  next.run(request).await
}

/// API routes plus static files from `public_dir`. Unknown paths fall back
/// to `index.html` when it exists.
pub fn router(state: AppState, public_dir: &Path) -> Router {
  let index = public_dir.join("index.html");
  let static_files = ServeDir::new(public_dir);

  let app = api::app();
  let app = if index.is_file() {
    app.fallback_service(static_files.fallback(ServeFile::new(index)))
  } else {
    tracing::warn!(
      path = %index.display(),
      "index.html not found, SPA fallback disabled"
    );
    app.fallback_service(static_files)
  };

  app
    .layer(CorsLayer::permissive())
    .layer(middleware::from_fn(log_request))
    .with_state(state)
}

pub async fn server(state: AppState, port: u16, public_dir: &Path) -> Result<(), AppError> {
  let app = router(state, public_dir);

  let addr = format!("0.0.0.0:{port}");
  let listener = TcpListener::bind(&addr).await?;

  tracing::info!("server started at http://{addr}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}
