pub mod attempt;
pub mod job;
pub mod question;
pub mod user;

pub use attempt::{AssessmentAttempt, AttemptStatus, QuestionEvaluation};
pub use job::{Difficulty, Job};
pub use question::{CandidateQuestion, McqOption, Question, QuestionType, TestCase};
pub use user::{User, UserProfile, UserRole};
