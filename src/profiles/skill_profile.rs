//! Mentee self-assessment captured before the quiz is generated.
//!
//! Every vocabulary here is closed: skills, goals and preferences are enums
//! whose serialized names match the labels shown on the intake form.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MentorError, Result};

/// Self-rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SkillRating(u8);

impl SkillRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        Self::try_from(value).map_err(MentorError::InvalidProfile)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SkillRating {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "rating {value} is outside {}..={}",
                Self::MIN,
                Self::MAX
            ))
        }
    }
}

impl From<SkillRating> for u8 {
    fn from(rating: SkillRating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TechnicalSkill {
    #[serde(rename = "SQL")]
    Sql,
    Python,
    #[serde(rename = "Data Warehousing")]
    DataWarehousing,
    #[serde(rename = "Big Data")]
    BigData,
    Cloud,
    #[serde(rename = "DB Management")]
    DbManagement,
    Visualization,
    #[serde(rename = "Version Control")]
    VersionControl,
    #[serde(rename = "Data Quality")]
    DataQuality,
    #[serde(rename = "APIs")]
    Apis,
}

impl TechnicalSkill {
    pub const ALL: [TechnicalSkill; 10] = [
        TechnicalSkill::Sql,
        TechnicalSkill::Python,
        TechnicalSkill::DataWarehousing,
        TechnicalSkill::BigData,
        TechnicalSkill::Cloud,
        TechnicalSkill::DbManagement,
        TechnicalSkill::Visualization,
        TechnicalSkill::VersionControl,
        TechnicalSkill::DataQuality,
        TechnicalSkill::Apis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TechnicalSkill::Sql => "SQL",
            TechnicalSkill::Python => "Python",
            TechnicalSkill::DataWarehousing => "Data Warehousing",
            TechnicalSkill::BigData => "Big Data",
            TechnicalSkill::Cloud => "Cloud",
            TechnicalSkill::DbManagement => "DB Management",
            TechnicalSkill::Visualization => "Visualization",
            TechnicalSkill::VersionControl => "Version Control",
            TechnicalSkill::DataQuality => "Data Quality",
            TechnicalSkill::Apis => "APIs",
        }
    }

    /// Slider default on the intake form.
    pub fn default_rating(self) -> SkillRating {
        match self {
            TechnicalSkill::BigData => SkillRating(1),
            TechnicalSkill::Cloud | TechnicalSkill::DbManagement | TechnicalSkill::Apis => {
                SkillRating(2)
            }
            _ => SkillRating(3),
        }
    }
}

impl fmt::Display for TechnicalSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SoftSkill {
    #[serde(rename = "Problem Solving")]
    ProblemSolving,
    Communication,
    Collaboration,
    #[serde(rename = "Time Management")]
    TimeManagement,
    Adaptability,
    #[serde(rename = "Project Management")]
    ProjectManagement,
    #[serde(rename = "Attention to Detail")]
    AttentionToDetail,
    Mentorship,
    Leadership,
    #[serde(rename = "Critical Thinking")]
    CriticalThinking,
}

impl SoftSkill {
    pub const ALL: [SoftSkill; 10] = [
        SoftSkill::ProblemSolving,
        SoftSkill::Communication,
        SoftSkill::Collaboration,
        SoftSkill::TimeManagement,
        SoftSkill::Adaptability,
        SoftSkill::ProjectManagement,
        SoftSkill::AttentionToDetail,
        SoftSkill::Mentorship,
        SoftSkill::Leadership,
        SoftSkill::CriticalThinking,
    ];

    pub fn default_rating(self) -> SkillRating {
        match self {
            SoftSkill::Mentorship | SoftSkill::Leadership => SkillRating(1),
            _ => SkillRating(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MentorMotivation {
    #[serde(rename = "To gain technical skills")]
    TechnicalSkills,
    #[serde(rename = "To seek career guidance")]
    CareerGuidance,
    #[serde(rename = "To expand my network")]
    Network,
    #[serde(rename = "To improve soft skills")]
    SoftSkills,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShortTermGoal {
    #[serde(rename = "Secure a job in data engineering")]
    SecureJob,
    #[serde(rename = "Improve a specific technical skill")]
    ImproveSkill,
    #[serde(rename = "Gain confidence")]
    GainConfidence,
    #[serde(rename = "Build a portfolio")]
    BuildPortfolio,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LongTermGoal {
    #[serde(rename = "Become a senior data engineer")]
    SeniorEngineer,
    #[serde(rename = "Leadership role")]
    Leadership,
    #[serde(rename = "Start a consultancy")]
    Consultancy,
    #[serde(rename = "Grow in current position")]
    GrowInPlace,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MentorshipGoal {
    #[serde(rename = "Clear career path")]
    CareerPath,
    #[serde(rename = "Master specific skills")]
    MasterSkills,
    #[serde(rename = "Portfolio/project")]
    Portfolio,
    Confidence,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuccessMetric {
    #[serde(rename = "Achieved goals")]
    AchievedGoals,
    #[serde(rename = "Improved skills/confidence")]
    ImprovedSkills,
    #[serde(rename = "Professional relationship")]
    Relationship,
    #[serde(rename = "Career advancement")]
    CareerAdvancement,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FeedbackStyle {
    #[default]
    Direct,
    #[serde(rename = "Encouraging with constructive criticism")]
    Encouraging,
    #[serde(rename = "Step-by-step guidance")]
    StepByStep,
    Written,
    Other,
}

impl FeedbackStyle {
    pub fn label(self) -> &'static str {
        match self {
            FeedbackStyle::Direct => "Direct",
            FeedbackStyle::Encouraging => "Encouraging with constructive criticism",
            FeedbackStyle::StepByStep => "Step-by-step guidance",
            FeedbackStyle::Written => "Written",
            FeedbackStyle::Other => "No stated preference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeetingFrequency {
    #[default]
    Weekly,
    #[serde(rename = "Bi-weekly")]
    BiWeekly,
    Monthly,
    #[serde(rename = "As needed")]
    AsNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CommunicationChannel {
    #[default]
    #[serde(rename = "Video calls")]
    VideoCalls,
    Phone,
    Emails,
    #[serde(rename = "Messaging apps")]
    MessagingApps,
    #[serde(rename = "In-person (if local)")]
    InPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Readiness {
    #[default]
    #[serde(rename = "Yes, let's proceed")]
    Proceed,
    #[serde(rename = "No, let's reassess")]
    Reassess,
    #[serde(rename = "Let's discuss further", alias = "Let’s discuss further")]
    DiscussFurther,
}

/// Normalized intake record for one mentee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub why_mentor: BTreeSet<MentorMotivation>,
    #[serde(default)]
    pub short_term_goals: BTreeSet<ShortTermGoal>,
    #[serde(default)]
    pub long_term_goals: BTreeSet<LongTermGoal>,
    #[serde(default)]
    pub feedback_style: FeedbackStyle,
    #[serde(default)]
    pub meeting_freq: MeetingFrequency,
    #[serde(default)]
    pub communication: CommunicationChannel,
    #[serde(default)]
    pub mentorship_goal: BTreeSet<MentorshipGoal>,
    #[serde(default)]
    pub success_metric: BTreeSet<SuccessMetric>,
    pub technical_skills: BTreeMap<TechnicalSkill, SkillRating>,
    pub soft_skills: BTreeMap<SoftSkill, SkillRating>,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub concerns: String,
    #[serde(default)]
    pub ready: Readiness,
}

impl SkillProfile {
    /// New profile with the intake form's default slider values.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            why_mentor: BTreeSet::new(),
            short_term_goals: BTreeSet::new(),
            long_term_goals: BTreeSet::new(),
            feedback_style: FeedbackStyle::default(),
            meeting_freq: MeetingFrequency::default(),
            communication: CommunicationChannel::default(),
            mentorship_goal: BTreeSet::new(),
            success_metric: BTreeSet::new(),
            technical_skills: TechnicalSkill::ALL
                .iter()
                .map(|s| (*s, s.default_rating()))
                .collect(),
            soft_skills: SoftSkill::ALL
                .iter()
                .map(|s| (*s, s.default_rating()))
                .collect(),
            interests: String::new(),
            concerns: String::new(),
            ready: Readiness::default(),
        }
    }

    pub fn with_technical(mut self, skill: TechnicalSkill, rating: u8) -> Result<Self> {
        self.technical_skills.insert(skill, SkillRating::new(rating)?);
        Ok(self)
    }

    pub fn with_soft(mut self, skill: SoftSkill, rating: u8) -> Result<Self> {
        self.soft_skills.insert(skill, SkillRating::new(rating)?);
        Ok(self)
    }

    pub fn with_interests(mut self, interests: impl Into<String>) -> Self {
        self.interests = interests.into();
        self
    }

    /// Trims identity fields and checks every vocabulary skill is rated.
    pub fn normalized(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        if self.name.is_empty() {
            return Err(MentorError::InvalidProfile("mentee name is required".into()));
        }
        if self.email.is_empty() {
            return Err(MentorError::InvalidProfile("mentee email is required".into()));
        }
        if let Some(missing) = TechnicalSkill::ALL
            .iter()
            .find(|s| !self.technical_skills.contains_key(s))
        {
            return Err(MentorError::InvalidProfile(format!(
                "technical skill {missing} has no rating"
            )));
        }
        if let Some(missing) = SoftSkill::ALL
            .iter()
            .find(|s| !self.soft_skills.contains_key(s))
        {
            return Err(MentorError::InvalidProfile(format!(
                "soft skill {missing:?} has no rating"
            )));
        }
        Ok(self)
    }

    /// One `Skill: r/5` line per technical skill, in form order.
    pub fn technical_summary(&self) -> String {
        self.technical_skills
            .iter()
            .map(|(skill, rating)| format!("{}: {}/{}", skill, rating.value(), SkillRating::MAX))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
