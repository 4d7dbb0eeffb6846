//! In-memory review store for tests and ephemeral sessions

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{AnswerLog, ReviewKey, ReviewState};

use super::{try_lock, validate_state, Result, ReviewStore};

type StateKey = (String, ReviewKey);

#[derive(Debug, Default)]
pub struct MemoryStore {
  states: Mutex<HashMap<StateKey, ReviewState>>,
  answers: Mutex<Vec<AnswerLog>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ReviewStore for MemoryStore {
  fn get_state(&self, learner_id: &str, key: &ReviewKey) -> Result<Option<ReviewState>> {
    let states = try_lock(&self.states)?;
    Ok(states.get(&(learner_id.to_string(), key.clone())).cloned())
  }

  fn put_state(&self, learner_id: &str, state: &ReviewState) -> Result<()> {
    validate_state(state)?;
    let mut states = try_lock(&self.states)?;
    states.insert((learner_id.to_string(), state.key()), state.clone());
    Ok(())
  }

  fn list_states(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<ReviewState>> {
    let states = try_lock(&self.states)?;
    let mut matching: Vec<ReviewState> = states
      .iter()
      .filter(|((learner, _), state)| learner == learner_id && state.matches(word_type, level))
      .map(|(_, state)| state.clone())
      .collect();
    matching.sort_by_key(|s| s.due_at);
    Ok(matching)
  }

  fn record_answer(&self, log: &AnswerLog) -> Result<i64> {
    let mut answers = try_lock(&self.answers)?;
    let id = answers.len() as i64 + 1;
    answers.push(AnswerLog { id, ..log.clone() });
    Ok(id)
  }

  fn list_answers(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<AnswerLog>> {
    let answers = try_lock(&self.answers)?;
    Ok(
      answers
        .iter()
        .filter(|a| a.learner_id == learner_id && a.word_type == word_type && a.level == level)
        .cloned()
        .collect(),
    )
  }
}
