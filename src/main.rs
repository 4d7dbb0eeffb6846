use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_srs::config;
use vocab_srs::db::SqliteStore;
use vocab_srs::domain::{ReviewKey, StudyMode, VocabItem};
use vocab_srs::session::{AnswerSubmission, ReviewSession};
use vocab_srs::srs::Scheduler;

/// Spaced-repetition review queue for Mandarin and Cantonese vocabulary
#[derive(Parser)]
#[command(name = "vocab-srs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
  /// Review database (overrides config.toml and VOCAB_SRS_DB_PATH)
  #[arg(long, global = true)]
  db: Option<PathBuf>,

  /// Learner the reviews belong to
  #[arg(long, global = true, default_value = "local")]
  learner: String,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the next items to study as JSON
  Queue {
    /// JSON array of vocabulary items
    #[arg(long)]
    pool: PathBuf,
    #[arg(long)]
    word_type: String,
    #[arg(long)]
    level: String,
    #[arg(long, default_value = "20")]
    count: usize,
  },

  /// Apply one answer and print the new review state as JSON
  Review {
    #[arg(long)]
    item: String,
    #[arg(long)]
    word_type: String,
    #[arg(long)]
    level: String,
    /// Whether the answer was correct
    #[arg(long, action = ArgAction::Set)]
    correct: bool,
    /// Time taken to answer
    #[arg(long, default_value = "0")]
    response_ms: i64,
    #[arg(long, default_value = "flashcard")]
    mode: String,
  },

  /// Print mastery counts for a track and level as JSON
  Stats {
    #[arg(long)]
    word_type: String,
    #[arg(long)]
    level: String,
  },
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocab_srs=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();
  let app_config = config::load_config().context("Failed to load configuration")?;
  let db_path = cli.db.clone().unwrap_or_else(|| app_config.database_path());

  let store = SqliteStore::open(&db_path)
    .with_context(|| format!("Failed to open review database {}", db_path.display()))?;
  let mut session = ReviewSession::new(store, Scheduler::new(app_config.srs), cli.learner);
  let now = Utc::now();
  tracing::debug!("Using {} for learner {}", db_path.display(), session.learner_id());

  match cli.command {
    Commands::Queue {
      pool,
      word_type,
      level,
      count,
    } => {
      let items = load_pool(&pool)?;
      let batch = session.next_batch(&items, &word_type, &level, count, now)?;
      println!("{}", serde_json::to_string_pretty(&batch)?);
    }
    Commands::Review {
      item,
      word_type,
      level,
      correct,
      response_ms,
      mode,
    } => {
      let study_mode =
        StudyMode::from_str(&mode).with_context(|| format!("Unknown study mode: {}", mode))?;
      let submission = AnswerSubmission {
        submission_id: format!("cli-{}-{}", item, now.timestamp_millis()),
        key: ReviewKey::new(item, word_type, level),
        is_correct: correct,
        response_time_ms: response_ms,
        study_mode,
      };
      let outcome = session.submit(&submission, now)?;
      println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Commands::Stats { word_type, level } => {
      let report = session.report(&word_type, &level, now)?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
  }

  Ok(())
}

fn load_pool(path: &Path) -> anyhow::Result<Vec<VocabItem>> {
  let contents = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read vocabulary pool {}", path.display()))?;
  let items: Vec<VocabItem> = serde_json::from_str(&contents)
    .with_context(|| format!("Invalid vocabulary pool {}", path.display()))?;
  tracing::debug!("Loaded {} vocabulary items", items.len());
  Ok(items)
}
