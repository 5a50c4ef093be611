//! Quiz generation, scoring and feedback for an assessment session.

pub mod feedback;
pub mod generator;
pub mod quiz;
pub mod scoring;

pub use feedback::{FeedbackBundle, FeedbackSynthesizer, ProjectRecommendation};
pub use generator::QuizGenerator;
pub use quiz::{Quiz, QuizQuestion, CHOICE_COUNT, SENTINEL_HINT};
pub use scoring::{score, AnswerRecord, ScoredQuiz};
