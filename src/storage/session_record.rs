//! Assembly and write-once persistence of completed sessions.

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::learning::{FeedbackBundle, ScoredQuiz};
use crate::profiles::SkillProfile;
use crate::storage::object_store::{compute_hash, ObjectStore};

const KEY_PREFIX: &str = "mentee_result";
const KEY_SUFFIX_LEN: usize = 6;

/// Everything produced by one session, persisted as a single JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub storage_key: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "self_assessment")]
    pub profile: SkillProfile,
    #[serde(rename = "quiz")]
    pub scored: ScoredQuiz,
    pub score: usize,
    pub total_questions: usize,
    #[serde(rename = "feedback_summary")]
    pub summary: String,
    pub summary_fallback: bool,
    #[serde(rename = "project_suggestion")]
    pub project: crate::learning::ProjectRecommendation,
}

/// Whether the record reached storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceStatus {
    Saved { key: String, sha256: String },
    Unsaved { error: PersistenceError },
}

impl PersistenceStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistenceStatus::Saved { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub record: SessionRecord,
    pub status: PersistenceStatus,
}

/// Derives `mentee_result_<Name>_<timestamp with micros>_<random>.json`.
///
/// Name and date alone collide on rapid resubmission, hence the sub-second
/// timestamp and random suffix.
pub fn storage_key(name: &str, at: DateTime<Utc>) -> String {
    let safe_name: String = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let safe_name = if safe_name.is_empty() {
        "anonymous".to_string()
    } else {
        safe_name
    };
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!(
        "{KEY_PREFIX}_{safe_name}_{}_{suffix}.json",
        at.format("%Y%m%d%H%M%S%6f")
    )
}

pub struct SessionRecorder<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> SessionRecorder<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Builds the record and writes it once. A failed write is reported in
    /// the outcome; the record itself is still returned.
    pub fn record(
        &self,
        session_id: Uuid,
        profile: SkillProfile,
        scored: ScoredQuiz,
        feedback: FeedbackBundle,
    ) -> RecordOutcome {
        let created_at = Utc::now();
        let storage_key = storage_key(&profile.name, created_at);
        let record = SessionRecord {
            session_id,
            storage_key,
            created_at,
            score: scored.score(),
            total_questions: scored.total(),
            profile,
            scored,
            summary: feedback.summary,
            summary_fallback: feedback.summary_fallback,
            project: feedback.project,
        };
        let status = self.persist(&record);
        RecordOutcome { record, status }
    }

    fn persist(&self, record: &SessionRecord) -> PersistenceStatus {
        let key = record.storage_key.clone();
        let payload = match serde_json::to_vec_pretty(record) {
            Ok(payload) => payload,
            Err(e) => {
                return PersistenceStatus::Unsaved {
                    error: PersistenceError {
                        key,
                        reason: format!("serialization failed: {e}"),
                    },
                }
            }
        };
        match self.store.put(&key, &payload) {
            Ok(()) => {
                let sha256 = compute_hash(&payload);
                info!(key = %key, bytes = payload.len(), "Session record saved");
                PersistenceStatus::Saved { key, sha256 }
            }
            Err(e) => {
                warn!(key = %key, error = %format!("{e:#}"), "Session record not saved");
                PersistenceStatus::Unsaved {
                    error: PersistenceError {
                        key,
                        reason: format!("{e:#}"),
                    },
                }
            }
        }
    }
}
