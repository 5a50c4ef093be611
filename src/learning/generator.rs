use tracing::{debug, warn};

use crate::error::{MentorError, Result};
use crate::learning::quiz::{Quiz, QuizQuestion};
use crate::profiles::SkillProfile;
use crate::services::ai::parse::decode;
use crate::services::ai::prompts::quiz_prompt;
use crate::services::ai::CompletionClient;

/// Produces a validated quiz from a skill profile with a single completion call.
pub struct QuizGenerator<'a> {
    client: &'a dyn CompletionClient,
    domain: &'a str,
    question_count: usize,
}

impl<'a> QuizGenerator<'a> {
    pub fn new(client: &'a dyn CompletionClient, domain: &'a str, question_count: usize) -> Self {
        Self {
            client,
            domain,
            question_count,
        }
    }

    pub fn generate(&self, profile: &SkillProfile) -> Result<Quiz> {
        let prompt = quiz_prompt(profile, self.domain, self.question_count);
        let raw = self.client.generate(&prompt).map_err(|e| {
            warn!(error = %e, "Quiz completion request failed");
            MentorError::CompletionUnavailable(format!("{e:#}"))
        })?;
        debug!(bytes = raw.len(), "Received quiz completion");
        let questions: Vec<QuizQuestion> = decode(&raw, "quiz")?;
        Quiz::from_questions(questions, self.question_count)
    }
}
