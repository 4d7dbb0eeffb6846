//! SQLite-backed review store

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::domain::{AnswerLog, MasteryBucket, ReviewKey, ReviewState, StudyMode};

use super::{run_migrations, try_lock, validate_state, DbPool, Result, ReviewStore};

const STATE_COLUMNS: &str = "item_id, word_type, level, repetitions, ease_factor, interval_days, \
                             due_at, last_reviewed_at, mastery";

const ANSWER_COLUMNS: &str = "id, learner_id, item_id, word_type, level, is_correct, quality, \
                              response_time_ms, study_mode, answered_at";

#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  /// Open (or create) a database file and run migrations
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let conn = Connection::open(path)?;
    tracing::info!("Opened review database at {}", path.display());
    Self::from_connection(conn)
  }

  pub fn open_in_memory() -> Result<Self> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  pub fn from_connection(conn: Connection) -> Result<Self> {
    run_migrations(&conn)?;
    Ok(Self {
      pool: Arc::new(Mutex::new(conn)),
    })
  }

  pub fn pool(&self) -> &DbPool {
    &self.pool
  }
}

impl ReviewStore for SqliteStore {
  fn get_state(&self, learner_id: &str, key: &ReviewKey) -> Result<Option<ReviewState>> {
    let conn = try_lock(&*self.pool)?;
    let mut stmt = conn.prepare(&format!(
      r#"
      SELECT {STATE_COLUMNS}
      FROM review_states
      WHERE learner_id = ?1 AND item_id = ?2 AND word_type = ?3 AND level = ?4
      "#
    ))?;

    let state = stmt
      .query_row(
        params![learner_id, key.item_id, key.word_type, key.level],
        row_to_state,
      )
      .optional()?;
    Ok(state)
  }

  fn put_state(&self, learner_id: &str, state: &ReviewState) -> Result<()> {
    validate_state(state)?;
    let conn = try_lock(&*self.pool)?;
    conn.execute(
      r#"
      INSERT INTO review_states (learner_id, item_id, word_type, level, repetitions, ease_factor,
                                 interval_days, due_at, last_reviewed_at, mastery)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
      ON CONFLICT (learner_id, item_id, word_type, level) DO UPDATE SET
        repetitions = excluded.repetitions,
        ease_factor = excluded.ease_factor,
        interval_days = excluded.interval_days,
        due_at = excluded.due_at,
        last_reviewed_at = excluded.last_reviewed_at,
        mastery = excluded.mastery
      "#,
      params![
        learner_id,
        state.item_id,
        state.word_type,
        state.level,
        state.repetitions,
        state.ease_factor,
        state.interval_days,
        state.due_at.to_rfc3339(),
        state.last_reviewed_at.map(|t| t.to_rfc3339()),
        state.mastery.as_str(),
      ],
    )?;
    Ok(())
  }

  fn list_states(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<ReviewState>> {
    let conn = try_lock(&*self.pool)?;
    let mut stmt = conn.prepare(&format!(
      r#"
      SELECT {STATE_COLUMNS}
      FROM review_states
      WHERE learner_id = ?1 AND word_type = ?2 AND level = ?3
      ORDER BY due_at ASC
      "#
    ))?;

    let states = stmt
      .query_map(params![learner_id, word_type, level], row_to_state)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(states)
  }

  fn record_answer(&self, log: &AnswerLog) -> Result<i64> {
    let conn = try_lock(&*self.pool)?;
    conn.execute(
      r#"
      INSERT INTO answer_logs (learner_id, item_id, word_type, level, is_correct, quality,
                               response_time_ms, study_mode, answered_at)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      "#,
      params![
        log.learner_id,
        log.item_id,
        log.word_type,
        log.level,
        log.is_correct,
        log.quality,
        log.response_time_ms,
        log.study_mode.as_str(),
        log.answered_at.to_rfc3339(),
      ],
    )?;
    Ok(conn.last_insert_rowid())
  }

  fn list_answers(&self, learner_id: &str, word_type: &str, level: &str) -> Result<Vec<AnswerLog>> {
    let conn = try_lock(&*self.pool)?;
    let mut stmt = conn.prepare(&format!(
      r#"
      SELECT {ANSWER_COLUMNS}
      FROM answer_logs
      WHERE learner_id = ?1 AND word_type = ?2 AND level = ?3
      ORDER BY answered_at ASC, id ASC
      "#
    ))?;

    let logs = stmt
      .query_map(params![learner_id, word_type, level], row_to_answer)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(logs)
  }
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_state(row: &Row<'_>) -> rusqlite::Result<ReviewState> {
  let due_at: String = row.get(6)?;
  let last_reviewed_at: Option<String> = row.get(7)?;
  let mastery: String = row.get(8)?;

  Ok(ReviewState {
    item_id: row.get(0)?,
    word_type: row.get(1)?,
    level: row.get(2)?,
    repetitions: row.get(3)?,
    ease_factor: row.get(4)?,
    interval_days: row.get(5)?,
    due_at: parse_timestamp(6, &due_at)?,
    last_reviewed_at: last_reviewed_at
      .as_deref()
      .map(|s| parse_timestamp(7, s))
      .transpose()?,
    mastery: MasteryBucket::from_str(&mastery).ok_or_else(|| {
      rusqlite::Error::FromSqlConversionFailure(8, Type::Text, format!("unknown mastery bucket: {}", mastery).into())
    })?,
  })
}

fn row_to_answer(row: &Row<'_>) -> rusqlite::Result<AnswerLog> {
  let study_mode: String = row.get(8)?;
  let answered_at: String = row.get(9)?;

  Ok(AnswerLog {
    id: row.get(0)?,
    learner_id: row.get(1)?,
    item_id: row.get(2)?,
    word_type: row.get(3)?,
    level: row.get(4)?,
    is_correct: row.get(5)?,
    quality: row.get(6)?,
    response_time_ms: row.get(7)?,
    // Unknown modes come from newer clients; keep the row
    study_mode: StudyMode::from_str(&study_mode).unwrap_or_default(),
    answered_at: parse_timestamp(9, &answered_at)?,
  })
}
