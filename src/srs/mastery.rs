use crate::config::SrsConfig;
use crate::domain::{MasteryBucket, ReviewState};

/// Classify an item for progress displays. Scheduling never reads this.
pub fn classify_mastery(state: &ReviewState, config: &SrsConfig) -> MasteryBucket {
  if state.repetitions <= 0 {
    MasteryBucket::New
  } else if state.interval_days >= config.mastered_interval_days {
    MasteryBucket::Mastered
  } else {
    MasteryBucket::Learning
  }
}
