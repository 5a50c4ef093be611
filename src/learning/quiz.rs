use serde::{Deserialize, Serialize};

use crate::error::{MentorError, Result};

/// Number of choices per question, sentinel included.
pub const CHOICE_COUNT: usize = 4;

/// Placeholder text requested for the first, never-correct choice.
pub const SENTINEL_HINT: &str = "Please select from the below options";

/// Multiple-choice question as produced by the completion service.
///
/// `choices[0]` is the sentinel: it is preselected in any form so that the
/// correct answer is never the default, and it is never a valid answer.
///
/// Deserialization runs the same checks as [`QuizQuestion::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuizQuestion")]
pub struct QuizQuestion {
    question: String,
    choices: Vec<String>,
    answer: String,
}

/// Wire shape of a question before validation.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuizQuestion {
    question: String,
    choices: Vec<String>,
    answer: String,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = MentorError;

    fn try_from(raw: RawQuizQuestion) -> Result<Self> {
        QuizQuestion::new(raw.question, raw.choices, raw.answer)
    }
}

impl QuizQuestion {
    pub fn new(
        question: impl Into<String>,
        choices: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self> {
        let q = Self {
            question: question.into(),
            choices,
            answer: answer.into(),
        };
        q.validate()?;
        Ok(q)
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// The reserved "no selection" choice.
    pub fn sentinel(&self) -> &str {
        &self.choices[0]
    }

    /// Choices a mentee can meaningfully pick.
    pub fn selectable_choices(&self) -> &[String] {
        &self.choices[1..]
    }

    pub fn correct_choice(&self) -> &str {
        &self.answer
    }

    fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(MentorError::MalformedGeneration(
                "question text is empty".into(),
            ));
        }
        if self.choices.len() != CHOICE_COUNT {
            return Err(MentorError::MalformedGeneration(format!(
                "question {:?} has {} choices, expected {CHOICE_COUNT}",
                self.question,
                self.choices.len()
            )));
        }
        for (i, choice) in self.choices.iter().enumerate() {
            if self.choices[..i].contains(choice) {
                return Err(MentorError::MalformedGeneration(format!(
                    "question {:?} repeats choice {:?}",
                    self.question, choice
                )));
            }
        }
        if self.answer == self.choices[0] {
            return Err(MentorError::MalformedGeneration(format!(
                "question {:?} marks the sentinel as correct",
                self.question
            )));
        }
        if !self.choices[1..].contains(&self.answer) {
            return Err(MentorError::MalformedGeneration(format!(
                "question {:?} answer {:?} is not among its choices",
                self.question, self.answer
            )));
        }
        Ok(())
    }
}

/// Ordered, immutable question set for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quiz {
    questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Builds a quiz, enforcing the exact question count and per-question invariants.
    pub fn from_questions(questions: Vec<QuizQuestion>, expected_count: usize) -> Result<Self> {
        if expected_count == 0 {
            return Err(MentorError::MalformedGeneration(
                "a quiz needs at least one question".into(),
            ));
        }
        if questions.len() != expected_count {
            return Err(MentorError::MalformedGeneration(format!(
                "expected {expected_count} questions, received {}",
                questions.len()
            )));
        }
        for question in &questions {
            question.validate()?;
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
