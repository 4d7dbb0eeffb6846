use rusqlite::{Connection, Result};

const SCHEMA_VERSION: i64 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS review_states (
      learner_id TEXT NOT NULL,
      item_id TEXT NOT NULL,
      word_type TEXT NOT NULL,
      level TEXT NOT NULL,
      repetitions INTEGER NOT NULL DEFAULT 0,
      ease_factor REAL NOT NULL DEFAULT 2.5,
      interval_days INTEGER NOT NULL DEFAULT 0,
      due_at TEXT NOT NULL,
      last_reviewed_at TEXT,
      mastery TEXT NOT NULL DEFAULT 'new',
      PRIMARY KEY (learner_id, item_id, word_type, level)
    );

    CREATE TABLE IF NOT EXISTS answer_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      learner_id TEXT NOT NULL,
      item_id TEXT NOT NULL,
      word_type TEXT NOT NULL,
      level TEXT NOT NULL,
      is_correct INTEGER NOT NULL,
      quality INTEGER NOT NULL,
      response_time_ms INTEGER NOT NULL DEFAULT 0,
      study_mode TEXT NOT NULL DEFAULT 'flashcard',
      answered_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_review_states_due
      ON review_states(learner_id, word_type, level, due_at);
    CREATE INDEX IF NOT EXISTS idx_answer_logs_learner
      ON answer_logs(learner_id, word_type, level, answered_at);
    "#,
  )?;

  let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
  if version > SCHEMA_VERSION {
    // Never downgrade the stamp
    tracing::warn!(
      "Review database schema v{} is newer than this build (v{})",
      version,
      SCHEMA_VERSION
    );
    return Ok(());
  }

  conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
  Ok(())
}
