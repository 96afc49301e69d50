use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mood {
  Sad,
  Happy,
  Angry,
  Flirty,
  Tired,
  Neutral,
}

/// Keyword groups in precedence order. The first group with any keyword
/// contained in the lower-cased message decides the mood.
const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
  (
    Mood::Sad,
    &["sad", "upset", "depressed", "unhappy", "lonely", "miss", "cry", "hurt"],
  ),
  (
    Mood::Happy,
    &["happy", "yay", "awesome", "great", "good", "excited"],
  ),
  (
    Mood::Angry,
    &["angry", "mad", "furious", "irritated", "annoyed"],
  ),
  (
    Mood::Flirty,
    &["flirt", "cute", "pretty", "hot", "date", "kiss", "love you"],
  ),
  (Mood::Tired, &["tired", "sleepy", "exhausted"]),
];

pub fn classify_mood(message: &str) -> Mood {
  let lower = message.to_lowercase();
  MOOD_KEYWORDS
    .iter()
    .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
    .map_or(Mood::Neutral, |(mood, _)| *mood)
}
