use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

/// Gemini exposes an OpenAI-compatible surface at this base.
const DEFAULT_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";

pub struct AppEnv {
  pub port: u16,
  pub openai_base_url: String,
  pub openai_api_key: String,
  pub openai_chat_model: String,
  pub completion_timeout: Duration,
  pub github_api_key: Option<String>,
  pub github_api_base_url: String,
  pub github_timeout: Duration,
  pub sessions_file: PathBuf,
  pub public_dir: PathBuf,
  pub persona_name: String,
}

impl AppEnv {
  fn new() -> Self {
    Self {
      port: parse_or("PORT", 3000),
      openai_base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
      openai_api_key: env::var("OPENAI_API_KEY")
        .or_else(|_| env::var("GEMINI_API_KEY"))
        .expect("OPENAI_API_KEY or GEMINI_API_KEY must be set"),
      openai_chat_model: var_or("OPENAI_CHAT_MODEL", DEFAULT_CHAT_MODEL),
      completion_timeout: Duration::from_secs(parse_or("COMPLETION_TIMEOUT_SECS", 60)),
      github_api_key: env::var("GITHUB_API_KEY").ok().filter(|key| !key.is_empty()),
      github_api_base_url: var_or("GITHUB_API_BASE_URL", DEFAULT_GITHUB_API_BASE_URL),
      github_timeout: Duration::from_secs(parse_or("GITHUB_TIMEOUT_SECS", 15)),
      sessions_file: var_or("SESSIONS_FILE", "sessions.json").into(),
      public_dir: var_or("PUBLIC_DIR", "public").into(),
      persona_name: var_or("PERSONA_NAME", "Nemia"),
    }
  }
}

fn var_or(key: &str, default: &str) -> String {
  env::var(key)
    .ok()
    .filter(|v| !v.is_empty())
    .unwrap_or_else(|| default.to_owned())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
  match env::var(key) {
    Ok(raw) => raw.parse().unwrap_or_else(|_| {
      tracing::warn!(key, value = %raw, "ignoring unparsable environment value");
      default
    }),
    Err(_) => default,
  }
}

pub static APP_ENV: LazyLock<AppEnv> = LazyLock::new(AppEnv::new);
