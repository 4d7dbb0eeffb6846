use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AnswerLog, MasteryBucket, ReviewState};

/// Progress summary for one learner, track and level
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MasteryReport {
  pub new: usize,
  pub learning: usize,
  pub mastered: usize,
  /// Reviewed items whose due date has passed
  pub due_now: usize,
  pub answers: usize,
  pub correct_answers: usize,
}

impl MasteryReport {
  pub fn total(&self) -> usize {
    self.new + self.learning + self.mastered
  }

  /// Share of correct answers, or None before any answers
  pub fn accuracy(&self) -> Option<f64> {
    if self.answers == 0 {
      None
    } else {
      Some(self.correct_answers as f64 / self.answers as f64)
    }
  }
}

pub fn mastery_report(states: &[ReviewState], answers: &[AnswerLog], now: DateTime<Utc>) -> MasteryReport {
  let mut report = MasteryReport::default();

  for state in states {
    match state.mastery {
      MasteryBucket::New => report.new += 1,
      MasteryBucket::Learning => report.learning += 1,
      MasteryBucket::Mastered => report.mastered += 1,
    }
    if state.is_due(now) {
      report.due_now += 1;
    }
  }

  report.answers = answers.len();
  report.correct_answers = answers.iter().filter(|a| a.is_correct).count();
  report
}
