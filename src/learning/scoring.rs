use serde::Serialize;

use crate::error::{MentorError, Result};
use crate::learning::quiz::Quiz;

/// Outcome for a single question, fixed at scoring time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question: String,
    #[serde(rename = "your_answer")]
    pub selected: String,
    #[serde(rename = "correct_answer")]
    pub correct_choice: String,
    pub correct: bool,
}

/// A quiz together with the mentee's answers and the derived score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredQuiz {
    quiz: Quiz,
    answers: Vec<AnswerRecord>,
    score: usize,
}

impl ScoredQuiz {
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.quiz.len()
    }

    pub fn missed(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.iter().filter(|a| !a.correct)
    }
}

/// Scores `submitted` against `quiz` by exact string equality.
///
/// No trimming or case folding: choices are compared verbatim as generated.
pub fn score(quiz: Quiz, submitted: Vec<String>) -> Result<ScoredQuiz> {
    if submitted.len() != quiz.len() {
        return Err(MentorError::AnswerCountMismatch {
            expected: quiz.len(),
            received: submitted.len(),
        });
    }
    let answers: Vec<AnswerRecord> = quiz
        .questions()
        .iter()
        .zip(submitted)
        .map(|(q, selected)| AnswerRecord {
            question: q.question().to_string(),
            correct: selected == q.correct_choice(),
            correct_choice: q.correct_choice().to_string(),
            selected,
        })
        .collect();
    let score = answers.iter().filter(|a| a.correct).count();
    Ok(ScoredQuiz {
        quiz,
        answers,
        score,
    })
}
