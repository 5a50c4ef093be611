//! Prompt builders for the three completion calls in a session.

use serde_json::json;

use crate::learning::quiz::{CHOICE_COUNT, SENTINEL_HINT};
use crate::learning::scoring::ScoredQuiz;
use crate::profiles::SkillProfile;

pub fn quiz_prompt(profile: &SkillProfile, domain: &str, question_count: usize) -> String {
    format!(
        r#"You are a professional technical mentor. Based on the following self-rated skills, generate exactly {question_count} multiple-choice questions (1 correct answer each) to assess the mentee's actual {domain} skill level. Focus on the rated topics, weighting questions toward the mentee's stated level for each skill.

Each question must have exactly {CHOICE_COUNT} distinct choices. The first choice must be the default selection "{SENTINEL_HINT}" so that the correct answer is never the default; it must never be the answer. The "answer" field must repeat one of the other choices verbatim.

Respond with JSON only, no commentary, using exactly these fields:
[
  {{
    "question": "What does SELECT * do in SQL?",
    "choices": ["{SENTINEL_HINT}", "Returns all columns", "Deletes data", "Joins tables"],
    "answer": "Returns all columns"
  }}
]

Skills:
{skills}
"#,
        skills = profile.technical_summary(),
    )
}

pub fn summary_prompt(scored: &ScoredQuiz, profile: &SkillProfile) -> String {
    let quiz: Vec<_> = scored
        .quiz()
        .questions()
        .iter()
        .zip(scored.answers())
        .map(|(q, a)| {
            json!({
                "question": q.question(),
                "choices": q.selectable_choices(),
                "correct_answer": q.correct_choice(),
                "mentee_answer": a.selected,
            })
        })
        .collect();
    let quiz_json = serde_json::to_string_pretty(&quiz).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are a technical mentor. Based on this quiz score ({score}/{total}) and the quiz content below, write a short feedback summary (~3-5 sentences) highlighting areas of strength and what the mentee should focus on improving. In addition, for each incorrect answer, list the question and the correct answer.
The mentee prefers feedback that is: {style}.

Quiz:
{quiz_json}
"#,
        score = scored.score(),
        total = scored.total(),
        style = profile.feedback_style.label(),
    )
}

pub fn project_prompt(profile: &SkillProfile, domain: &str) -> String {
    let interests = if profile.interests.trim().is_empty() {
        "(none given)"
    } else {
        profile.interests.trim()
    };
    format!(
        r#"You are a professional career mentor and coach. Based on the following self-rated skills and passions, design an end-to-end {domain} project.
The data source must be free or low cost and related to the passion areas below. Provide links telling the mentee where to access the data and/or how to request access. The project should cover extracting data from sources, loading it into a database, cleaning, modeling, aggregations, and a visualization in a tool of choice.

Skills:
{skills}

Passions:
{interests}

Respond with a single JSON object only, using exactly these fields:
{{
  "project_title": "Project title",
  "required_skills": "Skills and software needed to perform the tasks",
  "project_details": "Project details, data source links and access instructions"
}}
"#,
        skills = profile.technical_summary(),
    )
}
