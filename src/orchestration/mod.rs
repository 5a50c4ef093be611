pub mod events;
pub mod pipeline;
pub mod state;

pub use pipeline::{AssessmentSession, MentoringPipeline, SessionOutcome};
pub use state::SessionState;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::bases::WorkspacePaths;

/// Type of orchestration events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStarted,
    QuizGenerated,
    SessionAborted,
    QuizScored,
    FeedbackSynthesized,
    SessionRecorded,
    SessionUnsaved,
    NotificationSent,
    NotificationQueued,
    NotificationSkipped,
    NotificationFailed,
}

/// Session lifecycle event stored as JSONL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationEvent {
    pub event_id: Uuid,
    pub session_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl OrchestrationEvent {
    pub fn new(session_id: Uuid, event_type: EventType, details: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            session_id,
            event_type,
            timestamp: Utc::now(),
            details,
        }
    }
}

/// Append-only audit log of session events.
#[derive(Debug, Clone)]
pub struct OrchestrationLog {
    events_path: PathBuf,
}

impl OrchestrationLog {
    pub fn for_workspace(paths: &WorkspacePaths) -> Self {
        Self::at(paths.events_log())
    }

    pub fn at(events_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.events_path
    }

    pub fn append_event(&self, event: &OrchestrationEvent) -> Result<()> {
        if let Some(parent) = self.events_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        // Single write per line so concurrent sessions do not interleave records.
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn load_events(&self) -> Result<Vec<OrchestrationEvent>> {
        if !self.events_path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.events_path)?;
        let mut events = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            let event: OrchestrationEvent = serde_json::from_str(line)?;
            events.push(event);
        }
        Ok(events)
    }

    pub fn load_session_events(&self, session_id: Uuid) -> Result<Vec<OrchestrationEvent>> {
        Ok(self
            .load_events()?
            .into_iter()
            .filter(|event| event.session_id == session_id)
            .collect())
    }
}
