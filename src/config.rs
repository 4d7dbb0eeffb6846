//! Application configuration.
//!
//! All scheduler tuning values live in [`SrsConfig`] so they can be
//! overridden from `config.toml` instead of being scattered through the
//! scheduling code. Values not present in the file keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Highest quality score on the review scale.
pub const QUALITY_MAX: u8 = 5;

/// Default location of the review database.
pub const DEFAULT_DB_PATH: &str = "data/vocab_srs.db";

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Regular items shown before a failed item is repeated in a session
pub const REINFORCEMENT_GAP: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid config file: {0}")]
  Parse(#[from] toml::de::Error),
}

// ==================== SRS Configuration ====================

/// Tuning parameters for quality scoring and interval scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrsConfig {
  /// Correct answers faster than this score the top quality (5)
  pub fast_threshold_ms: i64,
  /// Correct answers faster than this score 4; slower ones score 3
  pub medium_threshold_ms: i64,
  /// Quality assigned to every incorrect answer
  pub incorrect_quality: u8,
  /// Reviews scoring below this are lapses
  pub passing_quality: u8,
  /// Ease factor floor
  pub min_ease_factor: f64,
  /// Ease factor given to items on first encounter
  pub starting_ease_factor: f64,
  /// Interval after a lapse
  pub lapse_interval_days: i64,
  /// Interval after the first successful repetition
  pub first_interval_days: i64,
  /// Interval after the second successful repetition
  pub second_interval_days: i64,
  /// Upper bound on any scheduled interval
  pub max_interval_days: i64,
  /// Items at or above this interval are reported as mastered
  pub mastered_interval_days: i64,
  /// EF' = EF + (bonus - (5 - q) * (linear + (5 - q) * quadratic))
  pub ease_bonus: f64,
  pub ease_linear_penalty: f64,
  pub ease_quadratic_penalty: f64,
}

impl Default for SrsConfig {
  fn default() -> Self {
    Self {
      fast_threshold_ms: 3_000,
      medium_threshold_ms: 8_000,
      incorrect_quality: 1,
      passing_quality: 3,
      min_ease_factor: 1.3,
      starting_ease_factor: 2.5,
      lapse_interval_days: 1,
      first_interval_days: 1,
      second_interval_days: 6,
      max_interval_days: 36_500,
      mastered_interval_days: 21,
      ease_bonus: 0.1,
      ease_linear_penalty: 0.08,
      ease_quadratic_penalty: 0.02,
    }
  }
}

impl SrsConfig {
  /// Ease change for a review of the given quality.
  pub fn ease_delta(&self, quality: u8) -> f64 {
    let miss = f64::from(QUALITY_MAX.saturating_sub(quality));
    self.ease_bonus - miss * (self.ease_linear_penalty + miss * self.ease_quadratic_penalty)
  }
}

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub database: DatabaseConfig,
  pub srs: SrsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
  pub path: Option<PathBuf>,
}

impl AppConfig {
  /// Database path with priority: config.toml > environment > default
  pub fn database_path(&self) -> PathBuf {
    if let Some(path) = &self.database.path {
      tracing::info!("Using database from config: {}", path.display());
      return path.clone();
    }

    for key in ["VOCAB_SRS_DB_PATH", "DATABASE_PATH"] {
      if let Ok(path) = std::env::var(key) {
        tracing::info!("Using database from {} env: {}", key, path);
        return PathBuf::from(path);
      }
    }

    let default = PathBuf::from(DEFAULT_DB_PATH);
    tracing::info!("Using default database path: {}", default.display());
    default
  }
}

/// Load configuration from `VOCAB_SRS_CONFIG` or `config.toml`.
///
/// A `.env` file is loaded first if present. A missing config file yields
/// the defaults; an unreadable or malformed one is an error.
pub fn load_config() -> Result<AppConfig, ConfigError> {
  let _ = dotenvy::dotenv();

  let path = std::env::var("VOCAB_SRS_CONFIG")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

  if !path.exists() {
    tracing::debug!("No config file at {}, using defaults", path.display());
    return Ok(AppConfig::default());
  }
  load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
  let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
  Ok(toml::from_str::<AppConfig>(contents)?)
}
