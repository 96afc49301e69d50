use std::time::Duration;

use anyhow::anyhow;
use axum::http::StatusCode;
use nemia_shared::APP_ENV;
use reqwest::{Client, Url, header};
use serde_json::Value;

const USER_AGENT: &str = "Nemia-chatbot";

#[derive(Debug, Clone)]
pub struct GithubConfig {
  pub base_url: String,
  pub token: Option<String>,
  pub timeout: Duration,
}

impl GithubConfig {
  pub fn from_env() -> Self {
    Self {
      base_url: APP_ENV.github_api_base_url.clone(),
      token: APP_ENV.github_api_key.clone(),
      timeout: APP_ENV.github_timeout,
    }
  }
}

/// Outcome of a user lookup that reached GitHub.
#[derive(Debug, Clone, PartialEq)]
pub enum GithubLookup {
  Found(Value),
  Failed {
    status: StatusCode,
    message: Option<String>,
  },
}

pub struct GithubClient {
  http: Client,
  base_url: Url,
  token: Option<String>,
}

impl GithubClient {
  pub fn new(config: GithubConfig) -> anyhow::Result<Self> {
    let http = Client::builder()
      .user_agent(USER_AGENT)
      .timeout(config.timeout)
      .build()?;

    Ok(Self {
      http,
      base_url: Url::parse(&config.base_url)?,
      token: config.token,
    })
  }

  fn user_url(&self, username: &str) -> anyhow::Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("GitHub base url cannot be a base: {}", self.base_url))?
      .pop_if_empty()
      .push("users")
      .push(username);
    Ok(url)
  }

  /// Fetch a public profile. Transport and decoding problems are errors;
  /// any answer from GitHub, good or bad, is a [`GithubLookup`].
  pub async fn user(&self, username: &str) -> anyhow::Result<GithubLookup> {
    let mut request = self
      .http
      .get(self.user_url(username)?)
      .header(header::ACCEPT, "application/vnd.github+json");
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = StatusCode::from_u16(response.status().as_u16())?;
    let body: Value = response.json().await?;

    if status.is_success() {
      return Ok(GithubLookup::Found(body));
    }

    tracing::warn!(username, %status, "GitHub lookup failed");
    Ok(GithubLookup::Failed {
      status,
      message: body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned),
    })
  }
}
