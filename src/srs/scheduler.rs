use chrono::{DateTime, Utc};

use crate::config::SrsConfig;
use crate::domain::{MasteryBucket, ReviewKey, ReviewState, VocabItem};

use super::{calculate_quality, classify_mastery, get_mixed_vocabulary, update_review};

/// The scheduling functions bound to one [`SrsConfig`].
///
/// Stateless apart from its config; every method is pure.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
  config: SrsConfig,
}

impl Scheduler {
  pub fn new(config: SrsConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SrsConfig {
    &self.config
  }

  pub fn calculate_quality(&self, is_correct: bool, response_time_ms: i64) -> u8 {
    calculate_quality(is_correct, response_time_ms, &self.config)
  }

  pub fn update_review(
    &self,
    key: &ReviewKey,
    prior: Option<&ReviewState>,
    is_correct: bool,
    quality: i32,
    now: DateTime<Utc>,
  ) -> ReviewState {
    update_review(key, prior, is_correct, quality, now, &self.config)
  }

  /// Score an answer and apply it in one step
  pub fn review(
    &self,
    key: &ReviewKey,
    prior: Option<&ReviewState>,
    is_correct: bool,
    response_time_ms: i64,
    now: DateTime<Utc>,
  ) -> (u8, ReviewState) {
    let quality = self.calculate_quality(is_correct, response_time_ms);
    let state = self.update_review(key, prior, is_correct, i32::from(quality), now);
    (quality, state)
  }

  pub fn classify(&self, state: &ReviewState) -> MasteryBucket {
    classify_mastery(state, &self.config)
  }

  /// State for an item on first encounter
  pub fn new_state(&self, key: &ReviewKey, now: DateTime<Utc>) -> ReviewState {
    ReviewState::new(key, self.config.starting_ease_factor, now)
  }

  pub fn mixed_vocabulary<'a>(
    &self,
    pool: &'a [VocabItem],
    states: &[ReviewState],
    word_type: &str,
    level: &str,
    count: usize,
    now: DateTime<Utc>,
  ) -> Vec<&'a VocabItem> {
    get_mixed_vocabulary(pool, states, word_type, level, count, now)
  }
}
