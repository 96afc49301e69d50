use std::{collections::BTreeMap, str::FromStr};

use nemia_shared::Turn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::facts::{FactKey, Facts};

/// Number of raw history entries carried into a prompt.
pub const RECENT_HISTORY_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  #[serde(default)]
  pub history: Vec<Turn>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "deserialize_facts")]
  pub facts: Facts,
}

impl Session {
  /// Last `n` raw entries in chronological order.
  #[must_use]
  pub fn recent_history(&self, n: usize) -> &[Turn] {
    let start = self.history.len().saturating_sub(n);
    &self.history[start..]
  }

  /// Merge what a message revealed. A found name replaces the old one and
  /// each extracted fact replaces its key; everything else is kept.
  pub fn remember(&mut self, name: Option<String>, facts: Facts) {
    if let Some(name) = name {
      self.name = Some(name);
    }
    self.facts.extend(facts);
  }

  pub fn push_turn(&mut self, user_text: impl Into<String>, bot_text: impl Into<String>) {
    self.history.push(Turn::user(user_text));
    self.history.push(Turn::bot(bot_text));
  }

  /// Forget the conversation, keep who the user is.
  pub fn clear_history(&mut self) {
    self.history.clear();
  }
}

/// Accepts a missing or `null` map and drops keys that are no longer known.
fn deserialize_facts<'de, D>(deserializer: D) -> Result<Facts, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default();

  Ok(
    raw
      .into_iter()
      .filter_map(|(key, value)| match FactKey::from_str(&key) {
        Ok(key) => Some((key, value)),
        Err(_) => {
          tracing::warn!(key = %key, "dropping unknown fact key");
          None
        }
      })
      .collect(),
  )
}
