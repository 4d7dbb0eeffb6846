//! Study session runner.
//!
//! Reads the learner's latest review state, schedules the answer, writes the
//! new state back and logs the answer. Each session remembers the
//! submissions it has applied so a resubmitted answer is not counted twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::db::{mastery_report, LogOnError, MasteryReport, ReviewStore, StoreError};
use crate::domain::{AnswerLog, ReviewKey, ReviewState, StudyMode, VocabItem};
use crate::srs::{ReinforcementQueue, Scheduler};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("submission {0} was already applied")]
  DuplicateSubmission(String),
  #[error(transparent)]
  Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// One answer as captured by the quiz UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSubmission {
  /// Client-generated id, unique per answer
  pub submission_id: String,
  pub key: ReviewKey,
  pub is_correct: bool,
  pub response_time_ms: i64,
  #[serde(default)]
  pub study_mode: StudyMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
  pub quality: u8,
  pub previous: Option<ReviewState>,
  pub state: ReviewState,
  /// None if the answer log could not be written
  pub answer_id: Option<i64>,
}

#[derive(Debug)]
pub struct ReviewSession<S> {
  store: S,
  scheduler: Scheduler,
  learner_id: String,
  applied: HashSet<String>,
  reinforcement: ReinforcementQueue,
}

impl<S: ReviewStore> ReviewSession<S> {
  pub fn new(store: S, scheduler: Scheduler, learner_id: impl Into<String>) -> Self {
    Self {
      store,
      scheduler,
      learner_id: learner_id.into(),
      applied: HashSet::new(),
      reinforcement: ReinforcementQueue::new(),
    }
  }

  pub fn learner_id(&self) -> &str {
    &self.learner_id
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn reinforcement(&self) -> &ReinforcementQueue {
    &self.reinforcement
  }

  /// Apply one answer: read, schedule, persist, log.
  ///
  /// A failing store write leaves the submission unapplied so it can be
  /// retried. A failing answer-log write is logged and does not undo the
  /// review.
  pub fn submit(&mut self, submission: &AnswerSubmission, now: DateTime<Utc>) -> Result<ReviewOutcome> {
    if self.applied.contains(&submission.submission_id) {
      tracing::warn!(
        "Ignoring duplicate submission {} for {}",
        submission.submission_id,
        submission.key.item_id
      );
      return Err(SessionError::DuplicateSubmission(submission.submission_id.clone()));
    }

    let key = &submission.key;
    let previous = self.store.get_state(&self.learner_id, key)?;
    let (quality, state) = self.scheduler.review(
      key,
      previous.as_ref(),
      submission.is_correct,
      submission.response_time_ms,
      now,
    );
    self.store.put_state(&self.learner_id, &state)?;
    self.applied.insert(submission.submission_id.clone());

    let log = AnswerLog::new(
      &self.learner_id,
      key,
      submission.is_correct,
      quality,
      submission.response_time_ms.max(0),
      submission.study_mode,
      now,
    );
    let answer_id = self.store.record_answer(&log).log_warn("Failed to record answer");

    if state.repetitions == 0 {
      self.reinforcement.push_failed(&key.item_id);
    } else {
      self.reinforcement.clear(&key.item_id);
    }

    tracing::debug!(
      "Reviewed {} ({}/{}): q={} reps={} interval={}d ease={:.2}",
      key.item_id,
      key.word_type,
      key.level,
      quality,
      state.repetitions,
      state.interval_days,
      state.ease_factor
    );

    Ok(ReviewOutcome {
      quality,
      previous,
      state,
      answer_id,
    })
  }

  /// The next `count` items to study, by due-ness
  pub fn next_batch<'a>(
    &self,
    pool: &'a [VocabItem],
    word_type: &str,
    level: &str,
    count: usize,
    now: DateTime<Utc>,
  ) -> Result<Vec<&'a VocabItem>> {
    let states = self.store.list_states(&self.learner_id, word_type, level)?;
    Ok(self.scheduler.mixed_vocabulary(pool, &states, word_type, level, count, now))
  }

  /// The single next item. Recent failures come back every few items and
  /// the item returned by the previous call is not repeated while the pool
  /// offers anything else.
  pub fn next_item<'a>(
    &mut self,
    pool: &'a [VocabItem],
    word_type: &str,
    level: &str,
    now: DateTime<Utc>,
  ) -> Result<Option<&'a VocabItem>> {
    let find = |item_id: &str| pool.iter().find(|i| i.id == item_id && i.matches(word_type, level));

    if let Some(item_id) = self.reinforcement.take_due(|id| find(id).is_some()) {
      if let Some(item) = find(item_id.as_str()) {
        tracing::debug!("Reinforcing {} ({}/{})", item.id, word_type, level);
        return Ok(Some(item));
      }
    }

    let batch = self.next_batch(pool, word_type, level, 2, now)?;
    let last = self.reinforcement.last_shown();
    let next = batch
      .iter()
      .copied()
      .find(|item| Some(item.id.as_str()) != last)
      .or_else(|| batch.first().copied());

    if let Some(item) = next {
      self.reinforcement.record_shown(&item.id);
    }
    Ok(next)
  }

  pub fn report(&self, word_type: &str, level: &str, now: DateTime<Utc>) -> Result<MasteryReport> {
    let states = self.store.list_states(&self.learner_id, word_type, level)?;
    let answers = self.store.list_answers(&self.learner_id, word_type, level)?;
    Ok(mastery_report(&states, &answers, now))
  }
}
