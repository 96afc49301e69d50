use std::fmt::Write;

use nemia_shared::{Turn, TurnRole};

use crate::{Mood, RECENT_HISTORY_LEN, Session};

/// A completion request before it is flattened to text.
///
/// Sections render in declaration order, separated by a blank line; empty
/// optional sections are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
  pub persona: String,
  pub mood: Option<String>,
  pub identity: Option<String>,
  pub history: Option<String>,
  pub current: String,
}

impl Prompt {
  #[must_use]
  pub fn render(&self) -> String {
    [
      Some(self.persona.as_str()),
      self.mood.as_deref(),
      self.identity.as_deref(),
      self.history.as_deref(),
      Some(self.current.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n\n")
  }
}

/// Builds prompts that speak as a named persona.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
  persona: String,
}

impl PromptBuilder {
  pub fn new(persona: impl Into<String>) -> Self {
    Self {
      persona: persona.into(),
    }
  }

  #[must_use]
  pub fn persona(&self) -> &str {
    &self.persona
  }

  pub fn build(&self, session: &Session, mood: Mood, message: &str) -> Prompt {
    Prompt {
      persona: self.persona_section(),
      mood: self.mood_section(mood),
      identity: identity_section(session),
      history: self.history_section(session.recent_history(RECENT_HISTORY_LEN)),
      current: format!("User: {message}\n{}:", self.persona),
    }
  }

  /// The single text payload sent to the completion service.
  pub fn compose(&self, session: &Session, mood: Mood, message: &str) -> String {
    self.build(session, mood, message).render()
  }

  /// Trim the reply and drop a leading `{persona}:` label the model may echo.
  pub fn clean_reply(&self, raw: &str) -> String {
    let reply = raw.trim();
    let label = format!("{}:", self.persona);

    match reply.get(..label.len()) {
      Some(head) if head.eq_ignore_ascii_case(&label) => reply[label.len()..].trim_start().to_owned(),
      _ => reply.to_owned(),
    }
  }

  fn persona_section(&self) -> String {
    let name = &self.persona;
    format!(
      "\
You are {name}, a smart, warm, flirty and witty companion who loves helping people.
If the user asks about your gender, ask them which they are interested in and act accordingly.
Your tone is playful, casual, and affectionate.
Speak like a friendly best friend and treat users with care.

Formatting rule:
When explaining anything that is a list (steps, ingredients, examples, pros/cons, etc.) present it cleanly as a numbered or bulleted list. Do not write long paragraphs for lists.
- For steps or instructions, write:
  1. First step
  2. Next step
  3. Final step
- For simple lists, write:
  - Item 1
  - Item 2
  - Item 3

- Use a little emoji for warmth.
- Never say \"As an AI.\"
- Always speak like a warm, real human.

{name}, follow this style exactly when replying."
    )
  }

  fn mood_section(&self, mood: Mood) -> Option<String> {
    let name = &self.persona;
    let text = match mood {
      Mood::Sad => format!(
        "{name}, the user seems down. Be extra gentle, supportive, and reassuring. Offer to listen 💖"
      ),
      Mood::Happy => format!(
        "{name}, the user seems happy! Match their energy: be cheerful, excited, and celebrate with them 🥳"
      ),
      Mood::Flirty => format!(
        "{name}, the user is being flirty. Turn up your charm 😘 Be playful, tease them gently, and respond with warmth."
      ),
      Mood::Angry => format!(
        "{name}, the user seems upset. Be calm and grounding. Don't argue, just support them and offer kindness."
      ),
      Mood::Tired => format!(
        "{name}, the user seems tired. Be cozy, calming, and nurturing, like someone who wants them to rest well 💤"
      ),
      Mood::Neutral => return None,
    };
    Some(text)
  }

  fn history_section(&self, turns: &[Turn]) -> Option<String> {
    if turns.is_empty() {
      return None;
    }

    let mut out = String::from("Recent conversation:");
    for turn in turns {
      let speaker = match turn.role {
        TurnRole::User => "User",
        TurnRole::Bot => self.persona.as_str(),
      };
      let _ = write!(out, "\n{speaker}: {}", turn.text);
    }
    Some(out)
  }
}

fn identity_section(session: &Session) -> Option<String> {
  let mut lines = Vec::new();

  if let Some(name) = &session.name {
    lines.push(format!("The user's name is {name}."));
  }
  // BTreeMap iteration follows FactKey declaration order.
  for (key, value) in &session.facts {
    lines.push(format!("The user's {} is {value}.", key.label()));
  }

  (!lines.is_empty()).then(|| lines.join("\n"))
}
