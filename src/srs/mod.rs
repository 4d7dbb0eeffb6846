pub mod mastery;
pub mod quality;
pub mod sampling;
pub mod scheduler;
pub mod selector;
pub mod sm2;

pub use mastery::classify_mastery;
pub use quality::calculate_quality;
pub use sampling::{WeightTable, WeightedSampler};
pub use scheduler::Scheduler;
pub use selector::{get_mixed_vocabulary, DuePriority, ReinforcementQueue};
pub use sm2::update_review;
