use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReviewKey;

/// Exercise type the answer was given in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
  #[default]
  Flashcard,
  MultipleChoice,
  FillInBlank,
  SentenceOrder,
  Handwriting,
}

impl StudyMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flashcard => "flashcard",
      Self::MultipleChoice => "multiple_choice",
      Self::FillInBlank => "fill_in_blank",
      Self::SentenceOrder => "sentence_order",
      Self::Handwriting => "handwriting",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "flashcard" => Some(Self::Flashcard),
      "multiple_choice" => Some(Self::MultipleChoice),
      "fill_in_blank" => Some(Self::FillInBlank),
      "sentence_order" => Some(Self::SentenceOrder),
      "handwriting" => Some(Self::Handwriting),
      _ => None,
    }
  }
}

/// Per-answer telemetry, recorded independently of scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerLog {
  pub id: i64,
  pub learner_id: String,
  pub item_id: String,
  pub word_type: String,
  pub level: String,
  pub is_correct: bool,
  pub quality: u8,
  pub response_time_ms: i64,
  pub study_mode: StudyMode,
  pub answered_at: DateTime<Utc>,
}

impl AnswerLog {
  pub fn new(
    learner_id: &str,
    key: &ReviewKey,
    is_correct: bool,
    quality: u8,
    response_time_ms: i64,
    study_mode: StudyMode,
    answered_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id: 0,
      learner_id: learner_id.to_string(),
      item_id: key.item_id.clone(),
      word_type: key.word_type.clone(),
      level: key.level.clone(),
      is_correct,
      quality,
      response_time_ms,
      study_mode,
      answered_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_study_mode_roundtrip() {
    let modes = [
      StudyMode::Flashcard,
      StudyMode::MultipleChoice,
      StudyMode::FillInBlank,
      StudyMode::SentenceOrder,
      StudyMode::Handwriting,
    ];
    for mode in modes {
      assert_eq!(StudyMode::from_str(mode.as_str()), Some(mode));
    }
  }

  #[test]
  fn test_study_mode_from_str_invalid() {
    assert_eq!(StudyMode::from_str("Flashcard"), None);
    assert_eq!(StudyMode::from_str(""), None);
  }
}
