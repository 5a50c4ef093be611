use serde::{Deserialize, Serialize};

/// Lifecycle of one assessment session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Collecting,
    QuizGenerated,
    QuizAnswered,
    Scored,
    FeedbackReady,
    Recorded,
    Notified,
    /// Generation failed before any side effect.
    Aborted,
}

impl SessionState {
    /// The single forward successor, if any.
    pub fn next(self) -> Option<SessionState> {
        match self {
            SessionState::Collecting => Some(SessionState::QuizGenerated),
            SessionState::QuizGenerated => Some(SessionState::QuizAnswered),
            SessionState::QuizAnswered => Some(SessionState::Scored),
            SessionState::Scored => Some(SessionState::FeedbackReady),
            SessionState::FeedbackReady => Some(SessionState::Recorded),
            SessionState::Recorded => Some(SessionState::Notified),
            SessionState::Notified | SessionState::Aborted => None,
        }
    }

    pub fn can_transition_to(self, to: SessionState) -> bool {
        match to {
            SessionState::Aborted => {
                matches!(self, SessionState::Collecting | SessionState::QuizGenerated)
            }
            _ => self.next() == Some(to),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Notified | SessionState::Aborted)
    }
}
