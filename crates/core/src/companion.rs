use std::sync::Arc;

use nemia_ai::{CompletionError, TextCompletion};
use nemia_shared::Turn;

use crate::{
  PromptBuilder, Session, SessionStore, StoreError, classify_mood, facts::extract,
};

/// Runs one chat turn end to end: extraction, prompt, completion, history,
/// flush.
pub struct Companion {
  store: Arc<SessionStore>,
  completion: Arc<dyn TextCompletion>,
  prompts: PromptBuilder,
}

impl Companion {
  pub fn new(
    store: Arc<SessionStore>,
    completion: Arc<dyn TextCompletion>,
    prompts: PromptBuilder,
  ) -> Self {
    Self {
      store,
      completion,
      prompts,
    }
  }

  #[must_use]
  pub fn persona(&self) -> &str {
    self.prompts.persona()
  }

  #[must_use]
  pub fn store(&self) -> &SessionStore {
    &self.store
  }

  /// Answer `message` in the context of `session_id`.
  ///
  /// Identity found in the message is merged before the completion call, so
  /// it is kept even when the call fails. History only grows on success.
  pub async fn chat(&self, session_id: &str, message: &str) -> Result<String, CompletionError> {
    let _guard = self.store.lock(session_id).await;

    let extraction = extract(message);
    let mood = classify_mood(message);
    tracing::debug!(
      session_id,
      %mood,
      name = extraction.name.as_deref(),
      facts = extraction.facts.len(),
      "analysed message"
    );

    let learned = !extraction.is_empty();
    let session = self
      .store
      .remember(session_id, extraction.name, extraction.facts)
      .await;
    let prompt = self.prompts.compose(&session, mood, message);

    let raw = match self.completion.complete(&prompt).await {
      Ok(raw) => raw,
      Err(err) => {
        if learned {
          self.store.flush().await;
        }
        return Err(err);
      }
    };

    let reply = self.prompts.clean_reply(&raw);
    self.store.apply_turn(session_id, message, &reply).await;
    self.store.flush().await;

    Ok(reply)
  }

  pub async fn reset(&self, session_id: &str) -> Result<Session, StoreError> {
    // Unknown ids must not leave a lock entry behind.
    if !self.store.contains(session_id).await {
      return Err(StoreError::NotFound(session_id.to_owned()));
    }
    let _guard = self.store.lock(session_id).await;
    let session = self.store.reset(session_id).await?;
    self.store.flush().await;
    Ok(session)
  }

  pub async fn history(&self, session_id: &str) -> Option<Vec<Turn>> {
    self.store.history(session_id).await
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use async_trait::async_trait;
  use pretty_assertions::assert_eq;
  use tokio::sync::Mutex;

  use super::*;
  use crate::{FactKey, Facts, persistence::MemoryPersistence};

  /// Replies with a fixed text and records every prompt it saw.
  #[derive(Default)]
  struct ScriptedCompletion {
    reply: String,
    delay: Option<Duration>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
  }

  impl ScriptedCompletion {
    fn replying(reply: &str) -> Self {
      Self {
        reply: reply.to_owned(),
        ..Self::default()
      }
    }
  }

  #[async_trait]
  impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
      self.prompts.lock().await.push(prompt.to_owned());
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      if self.fail {
        return Err(CompletionError::Empty);
      }
      Ok(self.reply.clone())
    }
  }

  fn companion(completion: Arc<ScriptedCompletion>) -> (Arc<MemoryPersistence>, Companion) {
    let persistence = Arc::new(MemoryPersistence::default());
    let store = Arc::new(SessionStore::new(persistence.clone()));
    let companion = Companion::new(store, completion, PromptBuilder::new("Nemia"));
    (persistence, companion)
  }

  #[tokio::test]
  async fn chat_learns_replies_and_persists() {
    let completion = Arc::new(ScriptedCompletion::replying("  Nemia: Nice to meet you, Alex!  "));
    let (persistence, companion) = companion(completion.clone());

    let reply = companion
      .chat("s1", "My name is Alex, I am 29 and I live in Austin.")
      .await
      .unwrap();
    assert_eq!(reply, "Nice to meet you, Alex!");

    let saved = persistence.snapshot().await;
    let session = &saved["s1"];
    assert_eq!(session.name.as_deref(), Some("Alex"));
    assert_eq!(
      session.facts,
      Facts::from([
        (FactKey::Age, "29".to_owned()),
        (FactKey::Location, "Austin".to_owned()),
      ])
    );
    assert_eq!(
      session.history,
      vec![
        Turn::user("My name is Alex, I am 29 and I live in Austin."),
        Turn::bot("Nice to meet you, Alex!"),
      ]
    );

    let prompts = completion.prompts.lock().await;
    assert!(prompts[0].contains("The user's name is Alex."));
    assert!(prompts[0].contains("The user's location is Austin."));
  }

  #[tokio::test]
  async fn later_fact_overwrites_earlier() {
    let (_, companion) = companion(Arc::new(ScriptedCompletion::replying("ok")));
    companion.chat("s1", "I live in Paris").await.unwrap();
    companion.chat("s1", "I enjoy painting").await.unwrap();
    companion.chat("s1", "I live in Rome now").await.unwrap();

    let session = companion.store().get("s1").await.unwrap();
    assert_eq!(
      session.facts,
      Facts::from([
        (FactKey::Location, "Rome now".to_owned()),
        (FactKey::Hobbies, "painting".to_owned()),
      ])
    );
    assert_eq!(session.history.len(), 6);
  }

  #[tokio::test]
  async fn failed_completion_keeps_facts_but_not_history() {
    let completion = Arc::new(ScriptedCompletion {
      fail: true,
      ..ScriptedCompletion::default()
    });
    let (persistence, companion) = companion(completion);

    let err = companion.chat("s1", "I am 40").await.unwrap_err();
    assert!(matches!(err, CompletionError::Empty));

    let saved = persistence.snapshot().await;
    assert!(saved["s1"].history.is_empty());
    assert_eq!(saved["s1"].facts.get(&FactKey::Age).map(String::as_str), Some("40"));
  }

  #[tokio::test]
  async fn reset_through_companion() {
    let (persistence, companion) = companion(Arc::new(ScriptedCompletion::replying("hey")));
    companion.chat("s1", "my name is Alex").await.unwrap();
    companion.chat("s1", "I am 29").await.unwrap();

    let session = companion.reset("s1").await.unwrap();
    assert!(session.history.is_empty());
    assert_eq!(session.name.as_deref(), Some("Alex"));
    assert_eq!(session.facts.get(&FactKey::Age).map(String::as_str), Some("29"));
    assert_eq!(persistence.snapshot().await["s1"], session);
    assert!(matches!(
      companion.reset("nobody").await,
      Err(StoreError::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn reset_of_unknown_sessions_leaves_no_trace() {
    let (persistence, companion) = companion(Arc::new(ScriptedCompletion::replying("hey")));
    for i in 0..100 {
      assert!(companion.reset(&format!("bogus{i}")).await.is_err());
    }
    assert_eq!(companion.store().lock_count().await, 0);
    assert!(companion.store().snapshot().await.is_empty());
    assert!(persistence.snapshot().await.is_empty());
  }

  #[tokio::test]
  async fn concurrent_turns_on_one_session_are_serialized() {
    let completion = Arc::new(ScriptedCompletion {
      reply: "sure".to_owned(),
      delay: Some(Duration::from_millis(30)),
      ..ScriptedCompletion::default()
    });
    let (_, companion) = companion(completion.clone());
    let companion = Arc::new(companion);

    let first = {
      let companion = Arc::clone(&companion);
      tokio::spawn(async move { companion.chat("s1", "first question").await })
    };
    let second = {
      let companion = Arc::clone(&companion);
      tokio::spawn(async move { companion.chat("s1", "second question").await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let history = companion.history("s1").await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(history[0].is_user() && !history[1].is_user());
    assert!(history[2].is_user() && !history[3].is_user());

    // whichever ran second saw the first turn in its prompt
    let prompts = completion.prompts.lock().await;
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains(&format!("User: {}\nNemia: sure", history[0].text)));
  }
}
