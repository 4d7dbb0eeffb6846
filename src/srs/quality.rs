use crate::config::{SrsConfig, QUALITY_MAX};

/// Map an answer to a 0-5 review quality.
///
/// Correctness dominates: every incorrect answer scores
/// `incorrect_quality` regardless of speed. Correct answers score 5, 4 or 3
/// depending on which latency threshold they beat. Negative response times
/// are treated as 0.
pub fn calculate_quality(is_correct: bool, response_time_ms: i64, config: &SrsConfig) -> u8 {
  if !is_correct {
    return config.incorrect_quality.min(config.passing_quality.saturating_sub(1));
  }

  let elapsed = response_time_ms.max(0);
  let quality = if elapsed < config.fast_threshold_ms {
    QUALITY_MAX
  } else if elapsed < config.medium_threshold_ms {
    QUALITY_MAX - 1
  } else {
    QUALITY_MAX - 2
  };
  quality.max(config.passing_quality).min(QUALITY_MAX)
}
