pub mod bases;
pub mod error;
pub mod learning;
pub mod notifications;
pub mod orchestration;
pub mod profiles;
pub mod services;
pub mod storage;

// Re-export commonly used types for convenience.
pub use bases::{AppConfig, WorkspacePaths};
pub use error::{MentorError, PersistenceError, Result};
pub use orchestration::{
    AssessmentSession, MentoringPipeline, OrchestrationEvent, OrchestrationLog, SessionOutcome,
    SessionState,
};
pub use profiles::SkillProfile;
