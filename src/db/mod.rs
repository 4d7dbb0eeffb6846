pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod stats;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::domain::{AnswerLog, ReviewKey, ReviewState};

pub use memory::MemoryStore;
pub use schema::run_migrations;
pub use sqlite::SqliteStore;
pub use stats::{mastery_report, MasteryReport};

pub type DbPool = Arc<Mutex<Connection>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Sqlite(#[from] rusqlite::Error),
  #[error("store unavailable: lock poisoned")]
  LockPoisoned,
  #[error("invalid value for {column}: {value}")]
  InvalidRow { column: &'static str, value: String },
  #[error("failed to prepare database directory: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence for review states and answer logs, keyed by learner.
///
/// The scheduler never touches a store. Callers read the latest state,
/// schedule, then write the result back; writes replace the whole row and
/// the last write wins.
pub trait ReviewStore: Send + Sync {
  fn get_state(&self, learner_id: &str, key: &ReviewKey) -> Result<Option<ReviewState>>;

  fn put_state(&self, learner_id: &str, state: &ReviewState) -> Result<()>;

  /// All states for one track and level
  fn list_states(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<ReviewState>>;

  /// Append an answer log and return its id
  fn record_answer(&self, log: &AnswerLog) -> Result<i64>;

  /// Answer logs for one track and level, oldest first
  fn list_answers(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<AnswerLog>>;
}

impl<T: ReviewStore + ?Sized> ReviewStore for Arc<T> {
  fn get_state(&self, learner_id: &str, key: &ReviewKey) -> Result<Option<ReviewState>> {
    (**self).get_state(learner_id, key)
  }

  fn put_state(&self, learner_id: &str, state: &ReviewState) -> Result<()> {
    (**self).put_state(learner_id, state)
  }

  fn list_states(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<ReviewState>> {
    (**self).list_states(learner_id, word_type, level)
  }

  fn record_answer(&self, log: &AnswerLog) -> Result<i64> {
    (**self).record_answer(log)
  }

  fn list_answers(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<AnswerLog>> {
    (**self).list_answers(learner_id, word_type, level)
  }
}

/// Reject states that cannot be stored faithfully
pub(crate) fn validate_state(state: &ReviewState) -> Result<()> {
  if !state.ease_factor.is_finite() {
    return Err(StoreError::InvalidRow {
      column: "ease_factor",
      value: state.ease_factor.to_string(),
    });
  }
  if state.item_id.is_empty() {
    return Err(StoreError::InvalidRow {
      column: "item_id",
      value: String::new(),
    });
  }
  Ok(())
}

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}

/// Acquire a mutex, mapping poisoning to [`StoreError::LockPoisoned`]
pub(crate) fn try_lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
  mutex.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Store mutex poisoned - a thread panicked while holding the lock");
    StoreError::LockPoisoned
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  #[test]
  fn test_log_warn_passes_ok_through() {
    let ok: std::result::Result<i32, String> = Ok(3);
    assert_eq!(ok.log_warn("ctx"), Some(3));
  }

  #[test]
  fn test_log_warn_swallows_error() {
    let err: std::result::Result<i64, String> = Err("disk full".into());
    assert_eq!(err.log_warn("Failed to record answer"), None);
  }

  #[test]
  fn test_validate_state_rejects_nan_ease() {
    let mut state = ReviewState::new(&ReviewKey::new("1", "mandarin", "hsk1"), 2.5, Utc::now());
    assert!(validate_state(&state).is_ok());
    state.ease_factor = f64::NAN;
    assert!(matches!(
      validate_state(&state),
      Err(StoreError::InvalidRow { column: "ease_factor", .. })
    ));
  }

  #[test]
  fn test_validate_state_rejects_empty_id() {
    let state = ReviewState::new(&ReviewKey::new("", "mandarin", "hsk1"), 2.5, Utc::now());
    assert!(matches!(
      validate_state(&state),
      Err(StoreError::InvalidRow { column: "item_id", .. })
    ));
  }

  #[test]
  fn test_try_lock_poisoned() {
    let mutex = Arc::new(Mutex::new(0));
    let poisoner = Arc::clone(&mutex);
    let _ = std::thread::spawn(move || {
      let _guard = poisoner.lock().unwrap();
      panic!("poison");
    })
    .join();
    assert!(matches!(try_lock(&*mutex), Err(StoreError::LockPoisoned)));
  }
}
