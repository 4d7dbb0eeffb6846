use chrono::{DateTime, Duration, Utc};

use crate::config::{SrsConfig, QUALITY_MAX};
use crate::domain::{ReviewKey, ReviewState};

use super::mastery::classify_mastery;

/// Apply one review to an item and return its replacement state.
///
/// A review is a lapse when the answer was wrong or `quality` is below
/// `passing_quality`. Lapses reset the repetition streak and interval;
/// passing reviews step through the two fixed intervals and then grow the
/// previous interval by the prior ease factor. The ease factor moves by the
/// SM-2 delta on every review and never drops below `min_ease_factor`.
/// A lapse is scored as at most `passing_quality - 1`, so it always lowers
/// ease even when the caller reports a high quality for a wrong answer.
///
/// Quality is clamped to 0..=5, malformed priors are replaced by new-item
/// defaults and a due date past chrono's range saturates, so this never
/// fails.
pub fn update_review(
  key: &ReviewKey,
  prior: Option<&ReviewState>,
  is_correct: bool,
  quality: i32,
  now: DateTime<Utc>,
  config: &SrsConfig,
) -> ReviewState {
  let quality = quality.clamp(0, i32::from(QUALITY_MAX)) as u8;
  let mut state = normalize_prior(key, prior, now, config);

  let lapsed = !is_correct || quality < config.passing_quality;
  let ease_quality = if lapsed {
    quality.min(config.passing_quality.saturating_sub(1))
  } else {
    quality
  };
  let new_ease_factor = (state.ease_factor + config.ease_delta(ease_quality)).max(config.min_ease_factor);

  let (new_interval, new_repetitions) = if lapsed {
    (config.lapse_interval_days, 0)
  } else {
    let interval = match state.repetitions {
      0 => config.first_interval_days,
      1 => config.second_interval_days,
      _ => {
        let grown = (state.interval_days as f64 * state.ease_factor).round() as i64;
        grown.max(state.interval_days).max(1)
      }
    };
    (interval, state.repetitions.saturating_add(1))
  };
  let new_interval = new_interval.clamp(0, config.max_interval_days.max(0));

  state.repetitions = new_repetitions;
  state.ease_factor = new_ease_factor;
  state.interval_days = new_interval;
  state.last_reviewed_at = Some(now);
  state.due_at = due_after(now, new_interval);
  state.mastery = classify_mastery(&state, config);
  state
}

fn due_after(now: DateTime<Utc>, interval_days: i64) -> DateTime<Utc> {
  Duration::try_days(interval_days)
    .and_then(|interval| now.checked_add_signed(interval))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn normalize_prior(
  key: &ReviewKey,
  prior: Option<&ReviewState>,
  now: DateTime<Utc>,
  config: &SrsConfig,
) -> ReviewState {
  let Some(prior) = prior else {
    return ReviewState::new(key, config.starting_ease_factor, now);
  };

  if prior.repetitions < 0 || prior.interval_days < 0 || !prior.ease_factor.is_finite() {
    tracing::warn!(
      "Malformed review state for {} (reps={}, interval={}, ease={}), resetting",
      key.item_id,
      prior.repetitions,
      prior.interval_days,
      prior.ease_factor
    );
    return ReviewState::new(key, config.starting_ease_factor, now);
  }

  let mut state = prior.clone();
  state.item_id.clone_from(&key.item_id);
  state.word_type.clone_from(&key.word_type);
  state.level.clone_from(&key.level);
  state.ease_factor = state.ease_factor.max(config.min_ease_factor);
  state
}
