use serde::{Deserialize, Serialize};

use super::ReviewKey;

/// A word record supplied by the vocabulary store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabItem {
  pub id: String,
  /// Hanzi form
  pub text: String,
  pub meaning: String,
  /// Pinyin or Jyutping, depending on the track
  #[serde(default)]
  pub romanization: Option<String>,
  pub word_type: String,
  pub level: String,
}

impl VocabItem {
  pub fn key(&self) -> ReviewKey {
    ReviewKey::new(&self.id, &self.word_type, &self.level)
  }

  pub fn matches(&self, word_type: &str, level: &str) -> bool {
    self.word_type == word_type && self.level == level
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_without_romanization() {
    let json = r#"{"id":"7","text":"你好","meaning":"hello","word_type":"mandarin","level":"hsk1"}"#;
    let item: VocabItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.text, "你好");
    assert!(item.romanization.is_none());
    assert_eq!(item.key(), ReviewKey::new("7", "mandarin", "hsk1"));
  }

  #[test]
  fn test_matches() {
    let item = VocabItem {
      id: "1".into(),
      text: "食飯".into(),
      meaning: "to eat".into(),
      romanization: Some("sik6 faan6".into()),
      word_type: "cantonese".into(),
      level: "unit1".into(),
    };
    assert!(item.matches("cantonese", "unit1"));
    assert!(!item.matches("mandarin", "unit1"));
  }
}
