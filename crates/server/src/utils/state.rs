use std::sync::Arc;

use nemia_core::Companion;

use super::GithubClient;

#[derive(Clone)]
pub struct AppState {
  pub companion: Arc<Companion>,
  pub github: Arc<GithubClient>,
}

impl AppState {
  #[must_use]
  pub fn new(companion: Arc<Companion>, github: GithubClient) -> Self {
    Self {
      companion,
      github: Arc::new(github),
    }
  }
}
