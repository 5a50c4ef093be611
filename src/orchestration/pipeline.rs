//! Drives one mentee through quiz generation, scoring, feedback,
//! persistence and follow-up.
//!
//! All per-session state lives in [`AssessmentSession`]. The pipeline itself
//! only borrows capabilities and config, so one pipeline can serve many
//! sessions from many threads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bases::AppConfig;
use crate::error::{MentorError, Result};
use crate::learning::{
    score, FeedbackBundle, FeedbackSynthesizer, Quiz, QuizGenerator, ScoredQuiz,
};
use crate::notifications::{FollowUp, MailTransport, NotificationDispatcher, NotificationOutcome};
use crate::orchestration::events::SessionEvents;
use crate::orchestration::state::SessionState;
use crate::orchestration::OrchestrationLog;
use crate::profiles::SkillProfile;
use crate::services::ai::CompletionClient;
use crate::storage::{ObjectStore, PersistenceStatus, SessionRecorder};

const SUMMARY_FALLBACK_NOTICE: &str =
    "Your written feedback could not be generated this time. Your score is still accurate.";

/// In-flight state of one assessment. Never shared between sessions.
#[derive(Debug)]
pub struct AssessmentSession {
    session_id: Uuid,
    state: SessionState,
    profile: SkillProfile,
    quiz: Option<Quiz>,
    scored: Option<ScoredQuiz>,
    started_at: DateTime<Utc>,
}

impl AssessmentSession {
    fn new(profile: SkillProfile) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Collecting,
            profile,
            quiz: None,
            scored: None,
            started_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &SkillProfile {
        &self.profile
    }

    /// The generated quiz, before or after scoring.
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz
            .as_ref()
            .or_else(|| self.scored.as_ref().map(ScoredQuiz::quiz))
    }

    pub fn scored(&self) -> Option<&ScoredQuiz> {
        self.scored.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    fn ensure_can(&self, to: SessionState) -> Result<()> {
        if self.state.can_transition_to(to) {
            Ok(())
        } else {
            Err(MentorError::InvalidTransition {
                from: self.state,
                to,
            })
        }
    }

    fn transition(&mut self, to: SessionState) -> Result<()> {
        advance(&mut self.state, to)
    }
}

/// Everything the surrounding surface needs to display a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub score: usize,
    pub total: usize,
    pub feedback: FeedbackBundle,
    pub persistence: PersistenceStatus,
    pub notification: NotificationOutcome,
    /// Categorized messages for degraded stages; safe to show the mentee.
    pub notices: Vec<String>,
}

impl SessionOutcome {
    pub fn is_saved(&self) -> bool {
        self.persistence.is_saved()
    }
}

pub struct MentoringPipeline<'a> {
    completion: &'a dyn CompletionClient,
    store: &'a dyn ObjectStore,
    transport: &'a dyn MailTransport,
    config: &'a AppConfig,
    events: SessionEvents,
}

impl<'a> MentoringPipeline<'a> {
    pub fn new(
        completion: &'a dyn CompletionClient,
        store: &'a dyn ObjectStore,
        transport: &'a dyn MailTransport,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            completion,
            store,
            transport,
            config,
            events: SessionEvents::default(),
        }
    }

    pub fn with_event_log(mut self, log: OrchestrationLog) -> Self {
        self.events = SessionEvents::new(Some(log));
        self
    }

    pub fn start(&self, profile: SkillProfile) -> Result<AssessmentSession> {
        let profile = profile.normalized()?;
        let session = AssessmentSession::new(profile);
        info!(session = %session.session_id, mentee = %session.profile.name, "Assessment session started");
        self.events
            .started(session.session_id, &session.profile.name);
        Ok(session)
    }

    /// Generates the quiz. Any failure moves the session to `Aborted`.
    pub fn generate_quiz<'s>(&self, session: &'s mut AssessmentSession) -> Result<&'s Quiz> {
        session.ensure_can(SessionState::QuizGenerated)?;
        let generator = QuizGenerator::new(
            self.completion,
            &self.config.quiz.domain,
            self.config.quiz.question_count,
        );
        match generator.generate(&session.profile) {
            Ok(quiz) => {
                session.transition(SessionState::QuizGenerated)?;
                info!(session = %session.session_id, questions = quiz.len(), "Quiz generated");
                self.events.quiz_generated(session.session_id, &quiz);
                Ok(session.quiz.insert(quiz))
            }
            Err(err) => {
                session.transition(SessionState::Aborted)?;
                warn!(session = %session.session_id, error = %err, "Quiz generation failed, session aborted");
                self.events.aborted(session.session_id, &err);
                Err(err)
            }
        }
    }

    /// Scores the submitted answers. A count mismatch leaves the session in
    /// `QuizGenerated` so the caller can resubmit.
    pub fn submit_answers<'s>(
        &self,
        session: &'s mut AssessmentSession,
        answers: Vec<String>,
    ) -> Result<&'s ScoredQuiz> {
        session.ensure_can(SessionState::QuizAnswered)?;
        let expected = session.quiz.as_ref().map_or(0, Quiz::len);
        if answers.len() != expected {
            warn!(
                session = %session.session_id,
                expected,
                received = answers.len(),
                "Answer count mismatch"
            );
            return Err(MentorError::AnswerCountMismatch {
                expected,
                received: answers.len(),
            });
        }
        let Some(quiz) = session.quiz.take() else {
            return Err(MentorError::InvalidTransition {
                from: session.state,
                to: SessionState::QuizAnswered,
            });
        };
        session.transition(SessionState::QuizAnswered)?;
        let scored = score(quiz, answers)?;
        session.transition(SessionState::Scored)?;
        info!(
            session = %session.session_id,
            score = scored.score(),
            total = scored.total(),
            "Quiz scored"
        );
        self.events.scored(session.session_id, &scored);
        Ok(session.scored.insert(scored))
    }

    /// Runs feedback, persistence and notification. Nothing after scoring
    /// can fail the session; degraded stages are reported in the outcome.
    pub fn complete(&self, mut session: AssessmentSession) -> Result<SessionOutcome> {
        session.ensure_can(SessionState::FeedbackReady)?;
        let Some(scored) = session.scored.take() else {
            return Err(MentorError::InvalidTransition {
                from: session.state,
                to: SessionState::FeedbackReady,
            });
        };
        let session_id = session.session_id;
        let mut notices = Vec::new();

        let feedback = FeedbackSynthesizer::new(self.completion, &self.config.quiz.domain)
            .synthesize(&scored, &session.profile);
        session.transition(SessionState::FeedbackReady)?;
        if feedback.summary_fallback {
            notices.push(SUMMARY_FALLBACK_NOTICE.to_string());
        }
        self.events.feedback(session_id, &feedback);

        let recorded = SessionRecorder::new(self.store).record(
            session_id,
            session.profile,
            scored,
            feedback.clone(),
        );
        advance(&mut session.state, SessionState::Recorded)?;
        if let PersistenceStatus::Unsaved { error } = &recorded.status {
            warn!(session = %session_id, error = %error, "Session record not saved");
            notices.push(MentorError::Persistence(error.clone()).user_message().to_string());
        }
        self.events.recorded(session_id, &recorded.status);

        let record = &recorded.record;
        let notification = NotificationDispatcher::new(
            self.transport,
            &self.config.notifications,
            &self.config.quiz.domain,
        )
        .notify(&FollowUp {
            email: &record.profile.email,
            name: &record.profile.name,
            score: record.score,
            total: record.total_questions,
            summary: &record.summary,
        });
        advance(&mut session.state, SessionState::Notified)?;
        if let NotificationOutcome::Failed { reason } = &notification {
            notices.push(
                MentorError::Notification(reason.clone())
                    .user_message()
                    .to_string(),
            );
        }
        self.events.notified(session_id, &notification);

        let finished_at = Utc::now();
        info!(
            session = %session_id,
            saved = recorded.status.is_saved(),
            elapsed_ms = (finished_at - session.started_at).num_milliseconds(),
            "Assessment session complete"
        );
        Ok(SessionOutcome {
            session_id,
            state: session.state,
            started_at: session.started_at,
            finished_at,
            score: record.score,
            total: record.total_questions,
            feedback,
            persistence: recorded.status,
            notification,
            notices,
        })
    }

    /// Full flow for callers that collect answers synchronously.
    pub fn run<F>(&self, profile: SkillProfile, answer: F) -> Result<SessionOutcome>
    where
        F: FnOnce(&Quiz) -> Vec<String>,
    {
        let mut session = self.start(profile)?;
        let answers = answer(self.generate_quiz(&mut session)?);
        self.submit_answers(&mut session, answers)?;
        self.complete(session)
    }
}

/// Field-level transition, usable once the session has been partly moved.
fn advance(state: &mut SessionState, to: SessionState) -> Result<()> {
    if !state.can_transition_to(to) {
        return Err(MentorError::InvalidTransition { from: *state, to });
    }
    *state = to;
    Ok(())
}
