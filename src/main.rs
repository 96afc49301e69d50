use std::sync::Arc;

use nemia_ai::{CompletionConfig, OpenAiCompletion};
use nemia_core::{Companion, JsonFileStore, PromptBuilder, SessionStore};
use nemia_server::{
  server,
  utils::{AppState, GithubClient, GithubConfig},
};
use nemia_shared::{APP_ENV, AppError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
  dotenvy::dotenv().ok();
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .with(tracing_error::ErrorLayer::default())
    .init();

  let persistence = Arc::new(JsonFileStore::new(&APP_ENV.sessions_file));
  tracing::info!(path = %persistence.path().display(), "loading sessions");
  let store = Arc::new(SessionStore::load(persistence).await?);

  let completion = Arc::new(OpenAiCompletion::new(CompletionConfig::from_env()));
  let companion = Arc::new(Companion::new(
    store,
    completion,
    PromptBuilder::new(&APP_ENV.persona_name),
  ));
  let github = GithubClient::new(GithubConfig::from_env())?;

  server(
    AppState::new(companion, github),
    APP_ENV.port,
    &APP_ENV.public_dir,
  )
  .await
}
