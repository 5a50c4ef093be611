//! Error taxonomy for the assessment pipeline.
//!
//! Capability adapters (completion, storage, mail) report failures as
//! `anyhow::Error`; the pipeline folds those into the categories below so each
//! kind carries its own recovery policy and user-facing message.

use serde::Serialize;
use thiserror::Error;

use crate::orchestration::state::SessionState;

/// Failure writing a session record through the storage capability.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("failed to persist session record {key}: {reason}")]
pub struct PersistenceError {
    pub key: String,
    pub reason: String,
}

/// Main error type for mentoring sessions.
#[derive(Error, Debug)]
pub enum MentorError {
    /// The submitted skill profile does not satisfy its invariants.
    #[error("invalid skill profile: {0}")]
    InvalidProfile(String),

    /// The completion capability itself failed (network, auth, empty body).
    #[error("completion service unavailable: {0}")]
    CompletionUnavailable(String),

    /// Completion output did not match the expected schema or invariants.
    #[error("malformed generation output: {0}")]
    MalformedGeneration(String),

    /// Caller submitted the wrong number of answers.
    #[error("expected {expected} answers, received {received}")]
    AnswerCountMismatch { expected: usize, received: usize },

    /// Storage write failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Email send failed.
    #[error("notification failed: {0}")]
    Notification(String),

    /// A session was driven out of order.
    #[error("invalid session transition from {from:?} to {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },
}

impl MentorError {
    /// Short category label used in audit events.
    pub fn kind(&self) -> &'static str {
        match self {
            MentorError::InvalidProfile(_) => "invalid_profile",
            MentorError::CompletionUnavailable(_) => "completion_unavailable",
            MentorError::MalformedGeneration(_) => "malformed_generation",
            MentorError::AnswerCountMismatch { .. } => "answer_count_mismatch",
            MentorError::Persistence(_) => "persistence",
            MentorError::Notification(_) => "notification",
            MentorError::InvalidTransition { .. } => "invalid_transition",
        }
    }

    /// Message safe to show a mentee. Never includes the underlying cause.
    pub fn user_message(&self) -> &'static str {
        match self {
            MentorError::InvalidProfile(_) => {
                "Some required assessment answers are missing or out of range. Please review the form and submit again."
            }
            MentorError::CompletionUnavailable(_) => {
                "The quiz service is unavailable right now. Please try again in a few minutes."
            }
            MentorError::MalformedGeneration(_) => {
                "There was a problem generating your quiz. Please submit your self-assessment again."
            }
            MentorError::AnswerCountMismatch { .. } => {
                "Please answer every quiz question before submitting."
            }
            MentorError::Persistence(_) => {
                "Your results are shown below but could not be saved. Please keep a copy of your feedback."
            }
            MentorError::Notification(_) => {
                "We could not send your follow-up email. Your results are still available here."
            }
            MentorError::InvalidTransition { .. } => {
                "This assessment session can no longer be continued. Please start a new one."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MentorError>;
