//! Seedable weighted sampling for pack draws and answer-option shuffling.
//!
//! Weights come from an explicit [`WeightTable`] so rarity tables live with
//! the caller. Seeding the sampler makes every draw reproducible in tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Values paired with relative selection weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable<T> {
  entries: Vec<(T, f64)>,
}

impl<T> Default for WeightTable<T> {
  fn default() -> Self {
    Self { entries: Vec::new() }
  }
}

impl<T> WeightTable<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, value: T, weight: f64) -> Self {
    self.push(value, weight);
    self
  }

  pub fn push(&mut self, value: T, weight: f64) {
    self.entries.push((value, weight));
  }

  /// Entries that can be drawn: finite, positive weight
  pub fn eligible(&self) -> impl Iterator<Item = (&T, f64)> {
    self
      .entries
      .iter()
      .filter(|(_, w)| w.is_finite() && *w > 0.0)
      .map(|(v, w)| (v, *w))
  }

  pub fn total_weight(&self) -> f64 {
    self.eligible().map(|(_, w)| w).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.eligible().next().is_none()
  }
}

impl<T> FromIterator<(T, f64)> for WeightTable<T> {
  fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct WeightedSampler {
  rng: ChaCha8Rng,
}

impl WeightedSampler {
  /// Deterministic sampler
  pub fn new(seed: u64) -> Self {
    Self {
      rng: ChaCha8Rng::seed_from_u64(seed),
    }
  }

  /// Sampler seeded from the thread RNG
  pub fn from_entropy() -> Self {
    Self {
      rng: ChaCha8Rng::from_rng(&mut rand::rng()),
    }
  }

  /// Pick one value; higher weight means more likely
  pub fn pick<'t, T>(&mut self, table: &'t WeightTable<T>) -> Option<&'t T> {
    let total = table.total_weight();
    if !(total > 0.0 && total.is_finite()) {
      return None;
    }

    let mut target = self.rng.random_range(0.0..total);
    let mut last = None;
    for (value, weight) in table.eligible() {
      if target < weight {
        return Some(value);
      }
      target -= weight;
      last = Some(value);
    }

    // Float rounding can leave a sliver past the final entry
    last
  }

  /// Draw `n` values with replacement
  pub fn draw<'t, T>(&mut self, table: &'t WeightTable<T>, n: usize) -> Vec<&'t T> {
    (0..n).map_while(|_| self.pick(table)).collect()
  }

  /// Shuffle in place (e.g. multiple-choice options)
  pub fn shuffle<T>(&mut self, items: &mut [T]) {
    items.shuffle(&mut self.rng);
  }
}
