//! Structured payloads for session lifecycle events.

use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::{EventType, OrchestrationEvent, OrchestrationLog};
use crate::error::MentorError;
use crate::learning::{FeedbackBundle, Quiz, ScoredQuiz};
use crate::notifications::NotificationOutcome;
use crate::storage::PersistenceStatus;

/// Writes session events to the audit log, if one is configured.
///
/// Audit failures are logged and swallowed; they never fail a session.
#[derive(Debug, Clone, Default)]
pub struct SessionEvents {
    log: Option<OrchestrationLog>,
}

impl SessionEvents {
    pub fn new(log: Option<OrchestrationLog>) -> Self {
        Self { log }
    }

    fn emit(&self, session_id: Uuid, event_type: EventType, details: serde_json::Value) {
        let Some(log) = &self.log else {
            return;
        };
        let event = OrchestrationEvent::new(session_id, event_type, details);
        if let Err(e) = log.append_event(&event) {
            warn!(
                session = %session_id,
                event = ?event_type,
                error = %e,
                "Failed to append orchestration event"
            );
        }
    }

    pub fn started(&self, session_id: Uuid, mentee: &str) {
        self.emit(session_id, EventType::SessionStarted, json!({ "mentee": mentee }));
    }

    pub fn quiz_generated(&self, session_id: Uuid, quiz: &Quiz) {
        self.emit(
            session_id,
            EventType::QuizGenerated,
            json!({ "questions": quiz.len() }),
        );
    }

    pub fn aborted(&self, session_id: Uuid, err: &MentorError) {
        self.emit(
            session_id,
            EventType::SessionAborted,
            json!({ "kind": err.kind(), "reason": err.to_string() }),
        );
    }

    pub fn scored(&self, session_id: Uuid, scored: &ScoredQuiz) {
        self.emit(
            session_id,
            EventType::QuizScored,
            json!({ "score": scored.score(), "total": scored.total() }),
        );
    }

    pub fn feedback(&self, session_id: Uuid, feedback: &FeedbackBundle) {
        self.emit(
            session_id,
            EventType::FeedbackSynthesized,
            json!({
                "summary_fallback": feedback.summary_fallback,
                "project_generation_failed": feedback.project.generation_failed,
            }),
        );
    }

    pub fn recorded(&self, session_id: Uuid, status: &PersistenceStatus) {
        match status {
            PersistenceStatus::Saved { key, sha256 } => self.emit(
                session_id,
                EventType::SessionRecorded,
                json!({ "key": key, "sha256": sha256 }),
            ),
            PersistenceStatus::Unsaved { error } => self.emit(
                session_id,
                EventType::SessionUnsaved,
                json!({ "key": error.key, "reason": error.reason }),
            ),
        }
    }

    pub fn notified(&self, session_id: Uuid, outcome: &NotificationOutcome) {
        match outcome {
            NotificationOutcome::Sent => {
                self.emit(session_id, EventType::NotificationSent, json!({}))
            }
            NotificationOutcome::Queued { spool_path } => self.emit(
                session_id,
                EventType::NotificationQueued,
                json!({ "spool_path": spool_path }),
            ),
            NotificationOutcome::Skipped => {
                self.emit(session_id, EventType::NotificationSkipped, json!({}))
            }
            NotificationOutcome::Failed { reason } => self.emit(
                session_id,
                EventType::NotificationFailed,
                json!({ "reason": reason }),
            ),
        }
    }
}
