use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
  User,
  Bot,
}

/// One entry of a conversation history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct Turn {
  pub role: TurnRole,
  pub text: String,
}

impl Turn {
  pub fn user(text: impl Into<String>) -> Self {
    Self {
      role: TurnRole::User,
      text: text.into(),
    }
  }

  pub fn bot(text: impl Into<String>) -> Self {
    Self {
      role: TurnRole::Bot,
      text: text.into(),
    }
  }

  #[must_use]
  pub const fn is_user(&self) -> bool {
    matches!(self.role, TurnRole::User)
  }
}
