//! Narrative feedback and project recommendation, generated after scoring.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MentorError, Result};
use crate::learning::scoring::ScoredQuiz;
use crate::profiles::SkillProfile;
use crate::services::ai::parse::decode;
use crate::services::ai::prompts::{project_prompt, summary_prompt};
use crate::services::ai::CompletionClient;

/// Marker carried by a recommendation that could not be generated.
pub const GENERATION_FAILED_MARKER: &str = "[generation failed]";

/// Shown in place of the narrative summary when it could not be generated.
pub const SUMMARY_UNAVAILABLE: &str =
    "A written feedback summary could not be generated for this session. Your score and the correct answers are listed below.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecommendation {
    #[serde(alias = "Project_Title")]
    pub project_title: String,
    #[serde(alias = "Project_Software_Skill_requirements")]
    pub required_skills: String,
    #[serde(alias = "Project_Details")]
    pub project_details: String,
    #[serde(default)]
    pub generation_failed: bool,
}

impl ProjectRecommendation {
    pub fn generation_failed() -> Self {
        Self {
            project_title: format!("{GENERATION_FAILED_MARKER} Project recommendation unavailable"),
            required_skills: String::new(),
            project_details: format!(
                "{GENERATION_FAILED_MARKER} A tailored project could not be generated. Your mentor will suggest one during your first session."
            ),
            generation_failed: true,
        }
    }

    fn validate(self) -> Result<Self> {
        if self.project_title.trim().is_empty() || self.project_details.trim().is_empty() {
            return Err(MentorError::MalformedGeneration(
                "project recommendation is missing a title or details".into(),
            ));
        }
        Ok(Self {
            generation_failed: false,
            ..self
        })
    }
}

/// Summary text plus project recommendation for a scored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackBundle {
    pub summary: String,
    pub project: ProjectRecommendation,
    /// True when `summary` is the placeholder rather than generated text.
    pub summary_fallback: bool,
}

pub struct FeedbackSynthesizer<'a> {
    client: &'a dyn CompletionClient,
    domain: &'a str,
}

impl<'a> FeedbackSynthesizer<'a> {
    pub fn new(client: &'a dyn CompletionClient, domain: &'a str) -> Self {
        Self { client, domain }
    }

    /// Narrative summary citing missed questions. Output must be non-empty.
    pub fn summarize(&self, scored: &ScoredQuiz, profile: &SkillProfile) -> Result<String> {
        let prompt = summary_prompt(scored, profile);
        let raw = self
            .client
            .generate(&prompt)
            .map_err(|e| MentorError::CompletionUnavailable(format!("{e:#}")))?;
        let summary = raw.trim();
        if summary.is_empty() {
            return Err(MentorError::MalformedGeneration(
                "feedback summary is empty".into(),
            ));
        }
        Ok(summary.to_string())
    }

    /// Project recommendation; never fails, falling back to a marked placeholder.
    pub fn recommend_project(&self, profile: &SkillProfile) -> ProjectRecommendation {
        let prompt = project_prompt(profile, self.domain);
        let parsed = self
            .client
            .generate(&prompt)
            .map_err(|e| MentorError::CompletionUnavailable(format!("{e:#}")))
            .and_then(|raw| decode::<ProjectRecommendation>(&raw, "project recommendation"))
            .and_then(ProjectRecommendation::validate);
        match parsed {
            Ok(project) => {
                debug!(title = %project.project_title, "Project recommendation generated");
                project
            }
            Err(err) => {
                warn!(error = %err, "Project recommendation failed, using fallback");
                ProjectRecommendation::generation_failed()
            }
        }
    }

    /// Runs both calls; a failed summary degrades to the placeholder.
    pub fn synthesize(&self, scored: &ScoredQuiz, profile: &SkillProfile) -> FeedbackBundle {
        let (summary, summary_fallback) = match self.summarize(scored, profile) {
            Ok(summary) => (summary, false),
            Err(err) => {
                warn!(error = %err, "Feedback summary failed, using placeholder");
                (SUMMARY_UNAVAILABLE.to_string(), true)
            }
        };
        let project = self.recommend_project(profile);
        FeedbackBundle {
            summary,
            project,
            summary_fallback,
        }
    }
}
