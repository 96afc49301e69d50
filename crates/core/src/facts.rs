use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of facts remembered about a user.
///
/// Declaration order is the order facts are rendered into a prompt.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FactKey {
  Age,
  Birthday,
  Location,
  Hobbies,
  FavoriteFood,
  FavoriteColor,
  Relationship,
  Personality,
}

impl FactKey {
  /// Human-readable form used in prompts, e.g. `favorite food`.
  #[must_use]
  pub fn label(self) -> String {
    self.as_ref().replace('_', " ")
  }
}

pub type Facts = BTreeMap<FactKey, String>;

/// Everything a single message revealed about the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
  pub name: Option<String>,
  pub facts: Facts,
}

impl Extraction {
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.facts.is_empty()
  }
}

// Runs up to the next clause separator. Periods are allowed here and the
// value is cut at the end of its sentence by `first_sentence`.
const FREE_TEXT: &str = r"([^,;!?\n]+)";

// A period after one of these does not end a sentence ("St. Louis").
const ABBREVIATIONS: &[&str] = &["st", "mt", "ft", "dr", "mr", "mrs", "ms", "jr", "sr"];

fn pattern(trigger: &str, capture: &str) -> Regex {
  Regex::new(&format!(r"(?i)\b(?:{trigger})\s+{capture}")).expect("fact pattern must compile")
}

static FACT_PATTERNS: LazyLock<Vec<(FactKey, Regex)>> = LazyLock::new(|| {
  vec![
    (
      FactKey::Age,
      pattern(r"i am|i['’]m|my age is", r"(\d{1,3})\b(?:\s*years?\s+old)?"),
    ),
    (FactKey::Birthday, pattern(r"my birthday is|i was born on", FREE_TEXT)),
    (FactKey::Location, pattern(r"i live in|i['’]m from|i am from", FREE_TEXT)),
    (FactKey::Hobbies, pattern(r"i like|i enjoy|my hobbies are", FREE_TEXT)),
    (
      FactKey::FavoriteFood,
      pattern(r"my favou?rite food is|i love eating", FREE_TEXT),
    ),
    (
      FactKey::FavoriteColor,
      pattern(r"my favou?rite colou?r is|i like the colou?r", FREE_TEXT),
    ),
    (
      FactKey::Relationship,
      pattern(r"i am|i['’]m", r"(single|taken|in a relationship|married)\b"),
    ),
    (
      FactKey::Personality,
      pattern(
        r"i am|i['’]m",
        r"(shy|funny|serious|romantic|chaotic|introvert|extrovert|ambivert)\b",
      ),
    ),
  ]
});

// Tried in order, first match wins.
static NAME_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
  let name = r"([a-zA-Z][a-zA-Z ]*)";
  [
    pattern("my name is", name),
    pattern("i am called", name),
    pattern("call me", name),
  ]
});

/// Cut `raw` at the first period followed by whitespace that does not close
/// a known abbreviation.
fn first_sentence(raw: &str) -> &str {
  raw
    .match_indices('.')
    .map(|(dot, _)| dot)
    .find(|&dot| {
      let word = raw[..dot]
        .rsplit(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or_default();
      raw[dot + 1..].starts_with(char::is_whitespace)
        && !ABBREVIATIONS.iter().any(|abbr| abbr.eq_ignore_ascii_case(word))
    })
    .map_or(raw, |dot| &raw[..dot])
}

fn clean_value(raw: &str) -> Option<String> {
  let value = first_sentence(raw)
    .trim()
    .trim_end_matches(['.', ',', '!', '?'])
    .trim_end();
  (!value.is_empty()).then(|| value.to_owned())
}

/// Apply every fact pattern independently. Keys whose pattern does not match
/// are absent from the result.
pub fn extract_facts(message: &str) -> Facts {
  FACT_PATTERNS
    .iter()
    .filter_map(|(key, regex)| {
      let capture = regex.captures(message)?.get(1)?;
      clean_value(capture.as_str()).map(|value| (*key, value))
    })
    .collect()
}

pub fn extract_name(message: &str) -> Option<String> {
  NAME_PATTERNS.iter().find_map(|regex| {
    let capture = regex.captures(message)?.get(1)?;
    let name = capture.as_str().trim();
    (!name.is_empty()).then(|| name.to_owned())
  })
}

pub fn extract(message: &str) -> Extraction {
  Extraction {
    name: extract_name(message),
    facts: extract_facts(message),
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use strum::IntoEnumIterator;

  use super::*;

  fn facts(pairs: &[(FactKey, &str)]) -> Facts {
    pairs.iter().map(|(k, v)| (*k, (*v).to_owned())).collect()
  }

  #[test]
  fn name_age_and_location_from_one_message() {
    let extraction = extract("My name is Alex, I am 29 and I live in Austin.");
    assert_eq!(extraction.name.as_deref(), Some("Alex"));
    assert_eq!(
      extraction.facts,
      facts(&[(FactKey::Age, "29"), (FactKey::Location, "Austin")])
    );
  }

  #[test]
  fn age_variants() {
    for message in ["I'm 42 years old", "i am 42", "My age is 42.", "I’m 42!"] {
      assert_eq!(
        extract_facts(message).get(&FactKey::Age).map(String::as_str),
        Some("42"),
        "{message}"
      );
    }
  }

  #[test]
  fn age_requires_short_number() {
    assert!(!extract_facts("I am 2024 proof").contains_key(&FactKey::Age));
    assert!(!extract_facts("I am from Lyon").contains_key(&FactKey::Age));
  }

  #[test]
  fn trailing_punctuation_is_stripped() {
    assert_eq!(
      extract_facts("my birthday is March 3rd!?"),
      facts(&[(FactKey::Birthday, "March 3rd")])
    );
    assert_eq!(
      extract_facts("I live in St. Louis..."),
      facts(&[(FactKey::Location, "St. Louis")])
    );
  }

  #[test]
  fn free_text_stops_at_sentence_end() {
    let found = extract_facts("I live in Austin. My favorite color is blue.");
    assert_eq!(
      found,
      facts(&[(FactKey::Location, "Austin"), (FactKey::FavoriteColor, "blue")])
    );
    assert_eq!(
      extract_facts("I live in St. Louis. I enjoy chess.")
        .get(&FactKey::Location)
        .map(String::as_str),
      Some("St. Louis")
    );
  }

  #[test]
  fn free_text_stops_at_clause_separator() {
    assert_eq!(
      extract_facts("I was born on July 4, and that's all"),
      facts(&[(FactKey::Birthday, "July 4")])
    );
  }

  #[test]
  fn independent_keys_can_fire_together() {
    let found = extract_facts("I'm from Oslo; I enjoy hiking; my favorite food is ramen.");
    assert_eq!(
      found,
      facts(&[
        (FactKey::Location, "Oslo"),
        (FactKey::Hobbies, "hiking"),
        (FactKey::FavoriteFood, "ramen"),
      ])
    );
  }

  #[test]
  fn colour_and_food_spellings() {
    assert_eq!(
      extract_facts("My favourite colour is teal")
        .get(&FactKey::FavoriteColor)
        .map(String::as_str),
      Some("teal")
    );
    assert_eq!(
      extract_facts("i love eating tacos")
        .get(&FactKey::FavoriteFood)
        .map(String::as_str),
      Some("tacos")
    );
  }

  #[test]
  fn relationship_and_personality() {
    assert_eq!(
      extract_facts("I'm married"),
      facts(&[(FactKey::Relationship, "married")])
    );
    assert_eq!(
      extract_facts("I am in a relationship"),
      facts(&[(FactKey::Relationship, "in a relationship")])
    );
    assert_eq!(
      extract_facts("honestly I'm chaotic"),
      facts(&[(FactKey::Personality, "chaotic")])
    );
    assert!(extract_facts("I am shyness itself").is_empty());
  }

  #[test]
  fn nothing_matches_plain_chat() {
    assert!(extract("what's the weather like?").is_empty());
  }

  #[test]
  fn name_priority_and_charset() {
    assert_eq!(extract_name("call me Sam").as_deref(), Some("Sam"));
    assert_eq!(
      extract_name("I am called Mary Jane, but call me MJ").as_deref(),
      Some("Mary Jane")
    );
    assert_eq!(
      extract_name("call me Bo, my name is Robert").as_deref(),
      Some("Robert")
    );
    assert_eq!(extract_name("my name is 1234"), None);
  }

  #[test]
  fn labels_use_spaces() {
    let labels: Vec<_> = FactKey::iter().map(FactKey::label).collect();
    assert_eq!(
      labels,
      [
        "age",
        "birthday",
        "location",
        "hobbies",
        "favorite food",
        "favorite color",
        "relationship",
        "personality"
      ]
    );
  }
}
