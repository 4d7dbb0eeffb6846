use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Identifies one schedulable unit: a vocabulary item within a track and level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewKey {
  pub item_id: String,
  /// Language/track tag, e.g. "mandarin" or "cantonese"
  pub word_type: String,
  /// Unit grouping, e.g. "hsk1"
  pub level: String,
}

impl ReviewKey {
  pub fn new(item_id: impl Into<String>, word_type: impl Into<String>, level: impl Into<String>) -> Self {
    Self {
      item_id: item_id.into(),
      word_type: word_type.into(),
      level: level.into(),
    }
  }
}

/// Display classification of an item's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MasteryBucket {
  /// Never reviewed, or relearning after a lapse
  #[default]
  New,
  Learning,
  Mastered,
}

impl MasteryBucket {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "new" => Some(Self::New),
      "learning" => Some(Self::Learning),
      "mastered" => Some(Self::Mastered),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Mastered => "mastered",
    }
  }
}

/// Scheduling state for one learner and one [`ReviewKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
  pub item_id: String,
  pub word_type: String,
  pub level: String,

  // SM-2 fields
  /// Consecutive passing reviews since the last lapse
  pub repetitions: i64,
  pub ease_factor: f64,
  /// Days between `last_reviewed_at` and `due_at`; 0 for new items
  pub interval_days: i64,
  pub due_at: DateTime<Utc>,
  pub last_reviewed_at: Option<DateTime<Utc>>,

  pub mastery: MasteryBucket,
}

impl ReviewState {
  /// State for an item the learner has never seen, due immediately.
  pub fn new(key: &ReviewKey, starting_ease_factor: f64, now: DateTime<Utc>) -> Self {
    Self {
      item_id: key.item_id.clone(),
      word_type: key.word_type.clone(),
      level: key.level.clone(),
      repetitions: 0,
      ease_factor: starting_ease_factor,
      interval_days: 0,
      due_at: now,
      last_reviewed_at: None,
      mastery: MasteryBucket::New,
    }
  }

  pub fn key(&self) -> ReviewKey {
    ReviewKey::new(&self.item_id, &self.word_type, &self.level)
  }

  pub fn matches(&self, word_type: &str, level: &str) -> bool {
    self.word_type == word_type && self.level == level
  }

  /// True if the item has never been reviewed
  pub fn is_unseen(&self) -> bool {
    self.last_reviewed_at.is_none()
  }

  /// True if the item has been reviewed and its due date has passed
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    !self.is_unseen() && self.due_at <= now
  }

  /// How long past due the item is (negative if not yet due)
  pub fn overdue_by(&self, now: DateTime<Utc>) -> Duration {
    now - self.due_at
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key() -> ReviewKey {
    ReviewKey::new("w-1", "mandarin", "hsk1")
  }

  #[test]
  fn test_new_state_defaults() {
    let now = Utc::now();
    let state = ReviewState::new(&key(), 2.5, now);
    assert_eq!(state.repetitions, 0);
    assert_eq!(state.interval_days, 0);
    assert_eq!(state.due_at, now);
    assert!(state.is_unseen());
    assert_eq!(state.mastery, MasteryBucket::New);
    assert_eq!(state.key(), key());
  }

  #[test]
  fn test_unseen_item_is_not_due() {
    let now = Utc::now();
    let state = ReviewState::new(&key(), 2.5, now - Duration::days(3));
    assert!(!state.is_due(now));
  }

  #[test]
  fn test_reviewed_item_due_after_due_date() {
    let now = Utc::now();
    let mut state = ReviewState::new(&key(), 2.5, now);
    state.last_reviewed_at = Some(now - Duration::days(6));
    state.due_at = now - Duration::days(5);
    assert!(state.is_due(now));
    assert_eq!(state.overdue_by(now), Duration::days(5));

    state.due_at = now + Duration::days(1);
    assert!(!state.is_due(now));
  }

  #[test]
  fn test_matches_track_and_level() {
    let state = ReviewState::new(&key(), 2.5, Utc::now());
    assert!(state.matches("mandarin", "hsk1"));
    assert!(!state.matches("cantonese", "hsk1"));
    assert!(!state.matches("mandarin", "hsk2"));
  }

  #[test]
  fn test_mastery_bucket_str_roundtrip() {
    for bucket in [MasteryBucket::New, MasteryBucket::Learning, MasteryBucket::Mastered] {
      assert_eq!(MasteryBucket::from_str(bucket.as_str()), Some(bucket));
    }
    assert_eq!(MasteryBucket::from_str("expert"), None);
  }

  #[test]
  fn test_state_serializes_bucket_snake_case() {
    let state = ReviewState::new(&key(), 2.5, Utc::now());
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["mastery"], "new");
    assert!(json["last_reviewed_at"].is_null());
  }
}
