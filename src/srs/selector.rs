//! Review queue selection and the in-session retry queue for failed items.
//!
//! Selection prefers, in order:
//! - Items whose review is overdue (most overdue first)
//! - Items the learner has never seen (pool order)
//! - Items not yet due (soonest first), to fill the batch

use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config;
use crate::domain::{ReviewState, VocabItem};

/// Selection tier of a candidate, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DuePriority {
  Due,
  Unseen,
  Upcoming,
}

/// Pick up to `count` items from `pool` for one track and level.
///
/// `states` holds whatever review rows the learner has; rows for other
/// tracks or levels are ignored, as are pool items outside the requested
/// track and level. Duplicate pool ids are kept once.
pub fn get_mixed_vocabulary<'a>(
  pool: &'a [VocabItem],
  states: &[ReviewState],
  word_type: &str,
  level: &str,
  count: usize,
  now: DateTime<Utc>,
) -> Vec<&'a VocabItem> {
  if count == 0 {
    return Vec::new();
  }

  let by_id: HashMap<&str, &ReviewState> = states
    .iter()
    .filter(|s| s.matches(word_type, level))
    .map(|s| (s.item_id.as_str(), s))
    .collect();

  let mut seen = HashSet::new();
  // Largest overdue_by first: most overdue among due items, soonest among
  // upcoming ones (their overdue_by is negative)
  let mut candidates: Vec<(DuePriority, Reverse<Duration>, &VocabItem)> = pool
    .iter()
    .filter(|item| item.matches(word_type, level))
    .filter(|&item| seen.insert(item.id.as_str()))
    .map(|item| match by_id.get(item.id.as_str()) {
      Some(state) if state.is_due(now) => (DuePriority::Due, Reverse(state.overdue_by(now)), item),
      Some(state) if !state.is_unseen() => (DuePriority::Upcoming, Reverse(state.overdue_by(now)), item),
      _ => (DuePriority::Unseen, Reverse(Duration::zero()), item),
    })
    .collect();

  // Stable sort keeps pool order among unseen items and equal due dates
  candidates.sort_by_key(|(priority, overdue, _)| (*priority, *overdue));

  tracing::debug!(
    "Selected from {} candidates for {}/{} (requested {})",
    candidates.len(),
    word_type,
    level,
    count
  );

  candidates
    .into_iter()
    .take(count)
    .map(|(_, _, item)| item)
    .collect()
}

/// Failed items waiting for a second look within the current session.
///
/// A queued item comes back once [`config::REINFORCEMENT_GAP`] other items
/// have been shown. It is never handed out straight after it was last
/// shown; in that case it waits for the following slot.
#[derive(Debug, Clone, Default)]
pub struct ReinforcementQueue {
  pending: VecDeque<String>,
  shown_since_retry: u32,
  last_shown: Option<String>,
}

impl ReinforcementQueue {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue a failed item; an item already queued keeps its place
  pub fn push_failed(&mut self, item_id: &str) {
    if !self.contains(item_id) {
      self.pending.push_back(item_id.to_string());
    }
  }

  /// Drop a recovered item
  pub fn clear(&mut self, item_id: &str) {
    self.pending.retain(|id| id != item_id);
  }

  pub fn contains(&self, item_id: &str) -> bool {
    self.pending.iter().any(|id| id == item_id)
  }

  pub fn len(&self) -> usize {
    self.pending.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pending.is_empty()
  }

  pub fn last_shown(&self) -> Option<&str> {
    self.last_shown.as_deref()
  }

  /// The queued item to show now, if the gap has elapsed.
  ///
  /// Ids rejected by `available` (e.g. gone from the pool) are discarded.
  pub fn take_due(&mut self, available: impl Fn(&str) -> bool) -> Option<String> {
    if self.shown_since_retry < config::REINFORCEMENT_GAP {
      return None;
    }
    self.pending.retain(|id| available(id.as_str()));

    let last = self.last_shown.as_deref();
    let position = self.pending.iter().position(|id| Some(id.as_str()) != last)?;
    let item_id = self.pending.remove(position)?;

    self.shown_since_retry = 0;
    self.last_shown = Some(item_id.clone());
    Some(item_id)
  }

  /// Record an item shown from the regular queue
  pub fn record_shown(&mut self, item_id: &str) {
    self.shown_since_retry = self.shown_since_retry.saturating_add(1);
    self.last_shown = Some(item_id.to_string());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ReviewKey;
  use chrono::Duration;

  fn item(id: &str) -> VocabItem {
    VocabItem {
      id: id.to_string(),
      text: format!("字{}", id),
      meaning: format!("meaning {}", id),
      romanization: None,
      word_type: "mandarin".into(),
      level: "hsk1".into(),
    }
  }

  fn reviewed(id: &str, due_in_days: i64, now: DateTime<Utc>) -> ReviewState {
    let mut state = ReviewState::new(&ReviewKey::new(id, "mandarin", "hsk1"), 2.5, now);
    state.repetitions = 1;
    state.interval_days = 1;
    state.last_reviewed_at = Some(now - Duration::days(10));
    state.due_at = now + Duration::days(due_in_days);
    state
  }

  fn ids(selection: &[&VocabItem]) -> Vec<String> {
    selection.iter().map(|i| i.id.clone()).collect()
  }

  #[test]
  fn test_due_then_unseen_before_upcoming() {
    let now = Utc::now();
    let pool = vec![item("C"), item("B"), item("A")];
    let states = vec![reviewed("A", -5, now), reviewed("C", 3, now)];

    let selection = get_mixed_vocabulary(&pool, &states, "mandarin", "hsk1", 2, now);
    assert_eq!(ids(&selection), vec!["A", "B"]);
  }

  #[test]
  fn test_most_overdue_first() {
    let now = Utc::now();
    let pool = vec![item("1"), item("2"), item("3")];
    let states = vec![reviewed("1", -1, now), reviewed("2", -9, now), reviewed("3", -4, now)];

    let selection = get_mixed_vocabulary(&pool, &states, "mandarin", "hsk1", 3, now);
    assert_eq!(ids(&selection), vec!["2", "3", "1"]);
  }

  #[test]
  fn test_unseen_keep_pool_order() {
    let now = Utc::now();
    let pool = vec![item("z"), item("a"), item("m")];
    let selection = get_mixed_vocabulary(&pool, &[], "mandarin", "hsk1", 10, now);
    assert_eq!(ids(&selection), vec!["z", "a", "m"]);
  }

  #[test]
  fn test_pads_with_upcoming_soonest_first() {
    let now = Utc::now();
    let pool = vec![item("far"), item("near"), item("new")];
    let states = vec![reviewed("far", 30, now), reviewed("near", 2, now)];

    let selection = get_mixed_vocabulary(&pool, &states, "mandarin", "hsk1", 3, now);
    assert_eq!(ids(&selection), vec!["new", "near", "far"]);
  }

  #[test]
  fn test_state_without_review_counts_as_unseen() {
    let now = Utc::now();
    let pool = vec![item("x")];
    let lazy = ReviewState::new(&ReviewKey::new("x", "mandarin", "hsk1"), 2.5, now - Duration::days(1));
    let selection = get_mixed_vocabulary(&pool, &[lazy], "mandarin", "hsk1", 1, now);
    assert_eq!(ids(&selection), vec!["x"]);
  }

  #[test]
  fn test_filters_track_and_level() {
    let now = Utc::now();
    let mut cantonese = item("yue");
    cantonese.word_type = "cantonese".into();
    let mut hsk2 = item("h2");
    hsk2.level = "hsk2".into();
    let pool = vec![cantonese, hsk2, item("ok")];

    let selection = get_mixed_vocabulary(&pool, &[], "mandarin", "hsk1", 5, now);
    assert_eq!(ids(&selection), vec!["ok"]);
  }

  #[test]
  fn test_ignores_states_from_other_level() {
    let now = Utc::now();
    let pool = vec![item("a"), item("b")];
    let mut other = reviewed("b", -3, now);
    other.level = "hsk3".into();

    // "b" has no hsk1 history, so it is unseen
    let selection = get_mixed_vocabulary(&pool, &[other], "mandarin", "hsk1", 2, now);
    assert_eq!(ids(&selection), vec!["a", "b"]);
  }

  #[test]
  fn test_count_limits_and_zero() {
    let now = Utc::now();
    let pool: Vec<_> = (0..10).map(|i| item(&i.to_string())).collect();
    assert_eq!(get_mixed_vocabulary(&pool, &[], "mandarin", "hsk1", 4, now).len(), 4);
    assert!(get_mixed_vocabulary(&pool, &[], "mandarin", "hsk1", 0, now).is_empty());
  }

  #[test]
  fn test_duplicate_pool_ids_kept_once() {
    let now = Utc::now();
    let pool = vec![item("dup"), item("dup"), item("solo")];
    let selection = get_mixed_vocabulary(&pool, &[], "mandarin", "hsk1", 3, now);
    assert_eq!(ids(&selection), vec!["dup", "solo"]);
  }

  // ReinforcementQueue tests

  fn show(queue: &mut ReinforcementQueue, ids: &[&str]) {
    for id in ids {
      queue.record_shown(id);
    }
  }

  #[test]
  fn test_queue_new_is_empty() {
    let mut queue = ReinforcementQueue::new();
    assert!(queue.is_empty());
    assert!(queue.last_shown().is_none());
    show(&mut queue, &["a", "b", "c"]);
    assert_eq!(queue.take_due(|_| true), None);
  }

  #[test]
  fn test_push_failed_keeps_one_entry() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("42");
    queue.push_failed("42");
    assert_eq!(queue.len(), 1);
    assert!(queue.contains("42"));
  }

  #[test]
  fn test_take_due_waits_for_gap() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("42");
    assert_eq!(queue.take_due(|_| true), None);

    show(&mut queue, &["1", "2"]);
    assert_eq!(queue.take_due(|_| true), None);
    show(&mut queue, &["3"]);
    assert_eq!(queue.take_due(|_| true), Some("42".to_string()));
    assert_eq!(queue.last_shown(), Some("42"));
    assert!(queue.is_empty());
  }

  #[test]
  fn test_take_due_defers_item_just_shown() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("x");
    show(&mut queue, &["a", "b", "x"]);

    assert_eq!(queue.take_due(|_| true), None);
    assert!(queue.contains("x"));

    show(&mut queue, &["a"]);
    assert_eq!(queue.take_due(|_| true), Some("x".to_string()));
  }

  #[test]
  fn test_take_due_skips_to_other_queued_item() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("x");
    queue.push_failed("y");
    show(&mut queue, &["a", "b", "x"]);

    assert_eq!(queue.take_due(|_| true), Some("y".to_string()));
    assert!(queue.contains("x"));
  }

  #[test]
  fn test_take_due_drops_unavailable() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("gone");
    queue.push_failed("kept");
    show(&mut queue, &["a", "b", "c"]);

    assert_eq!(queue.take_due(|id| id != "gone"), Some("kept".to_string()));
    assert!(!queue.contains("gone"));
  }

  #[test]
  fn test_clear_removes_only_that_item() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("1");
    queue.push_failed("2");
    queue.clear("1");
    queue.clear("missing");
    assert!(!queue.contains("1"));
    assert_eq!(queue.len(), 1);
  }

  #[test]
  fn test_take_due_fifo_with_reset_gap() {
    let mut queue = ReinforcementQueue::new();
    queue.push_failed("1");
    queue.push_failed("2");
    show(&mut queue, &["a", "b", "c"]);
    assert_eq!(queue.take_due(|_| true), Some("1".to_string()));
    assert_eq!(queue.take_due(|_| true), None);
    show(&mut queue, &["d", "e", "f"]);
    assert_eq!(queue.take_due(|_| true), Some("2".to_string()));
  }
}
