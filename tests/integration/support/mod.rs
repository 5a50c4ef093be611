//! Scripted capability fakes shared by the integration suites.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use mentorbase::learning::{Quiz, SENTINEL_HINT};
use mentorbase::notifications::{Delivery, MailConnection, MailTransport, OutgoingMail};
use mentorbase::profiles::TechnicalSkill;
use mentorbase::services::ai::CompletionClient;
use mentorbase::storage::ObjectStore;
use mentorbase::SkillProfile;
use serde_json::json;

pub const SUMMARY_TEXT: &str =
    "Strong SQL fundamentals. Review window functions and partitioning strategies.";

pub fn mentee(name: &str) -> SkillProfile {
    SkillProfile::new(name, "mentee@example.com")
        .with_technical(TechnicalSkill::Sql, 4)
        .and_then(|p| p.with_technical(TechnicalSkill::Python, 2))
        .expect("ratings in range")
        .with_interests("public transit, cycling")
}

/// Quiz output in the shape the completion service is asked for.
pub fn quiz_json(count: usize) -> String {
    let questions: Vec<_> = (1..=count)
        .map(|n| {
            json!({
                "question": format!("Which statement about topic {n} is true?"),
                "choices": [
                    SENTINEL_HINT,
                    format!("Correct statement {n}"),
                    format!("Plausible distractor {n}"),
                    format!("Unrelated claim {n}"),
                ],
                "answer": format!("Correct statement {n}"),
            })
        })
        .collect();
    serde_json::to_string_pretty(&questions).expect("serializable")
}

pub fn project_json() -> String {
    json!({
        "project_title": "Transit Delay Warehouse",
        "required_skills": "Python, SQL, dbt, Metabase",
        "project_details": "Pull GTFS-realtime feeds from https://transitfeeds.com and model delays by route.",
    })
    .to_string()
}

pub fn correct_answers(quiz: &Quiz) -> Vec<String> {
    quiz.questions()
        .iter()
        .map(|q| q.correct_choice().to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Quiz,
    Summary,
    Project,
}

impl PromptKind {
    pub fn of(prompt: &str) -> Self {
        if prompt.contains("\"project_title\"") {
            PromptKind::Project
        } else if prompt.contains("feedback summary") {
            PromptKind::Summary
        } else {
            PromptKind::Quiz
        }
    }
}

type Reply = std::result::Result<String, String>;

/// Answers each prompt kind with a fixed reply and records every prompt.
pub struct ScriptedCompletion {
    quiz: Reply,
    summary: Reply,
    project: Reply,
    prompts: Mutex<Vec<(PromptKind, String)>>,
}

impl ScriptedCompletion {
    pub fn healthy(question_count: usize) -> Self {
        Self {
            quiz: Ok(quiz_json(question_count)),
            summary: Ok(SUMMARY_TEXT.to_string()),
            project: Ok(project_json()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_quiz(mut self, reply: Reply) -> Self {
        self.quiz = reply;
        self
    }

    pub fn with_summary(mut self, reply: Reply) -> Self {
        self.summary = reply;
        self
    }

    pub fn with_project(mut self, reply: Reply) -> Self {
        self.project = reply;
        self
    }

    pub fn calls(&self, kind: PromptKind) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self, kind: PromptKind) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.clone())
    }
}

impl CompletionClient for ScriptedCompletion {
    fn generate(&self, prompt: &str) -> Result<String> {
        let kind = PromptKind::of(prompt);
        self.prompts
            .lock()
            .unwrap()
            .push((kind, prompt.to_string()));
        let reply = match kind {
            PromptKind::Quiz => &self.quiz,
            PromptKind::Summary => &self.summary,
            PromptKind::Project => &self.project,
        };
        reply.clone().map_err(|e| anyhow!(e))
    }
}

/// In-memory write-once store that can be told to reject every write.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<serde_json::Value> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(key)
            .map(|bytes| serde_json::from_slice(bytes).expect("stored record is JSON"))
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, key: &str, payload: &[u8]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("503 Service Unavailable");
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            bail!("object {key} already exists");
        }
        objects.insert(key.to_string(), payload.to_vec());
        Ok(())
    }
}

/// Captures sent mail and counts connection lifecycle calls.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    fail: bool,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

struct RecordingConnection<'a> {
    transport: &'a RecordingTransport,
}

impl MailTransport for RecordingTransport {
    fn connect(&self) -> Result<Box<dyn MailConnection + '_>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingConnection { transport: self }))
    }
}

impl MailConnection for RecordingConnection<'_> {
    fn send(&mut self, mail: &OutgoingMail) -> Result<Delivery> {
        if self.transport.fail {
            bail!("535 5.7.8 authentication credentials invalid");
        }
        self.transport.sent.lock().unwrap().push(mail.clone());
        Ok(Delivery::Sent)
    }

    fn close(&mut self) -> Result<()> {
        self.transport.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
