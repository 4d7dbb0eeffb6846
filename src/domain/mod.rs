pub mod answer;
pub mod review_state;
pub mod vocab;

pub use answer::{AnswerLog, StudyMode};
pub use review_state::{MasteryBucket, ReviewKey, ReviewState};
pub use vocab::VocabItem;
