use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use mentorbase::bases::{ensure_workspace_structure, load_or_default};
use mentorbase::learning::{Quiz, QuizQuestion};
use mentorbase::notifications::{transport_from_settings, NotificationOutcome};
use mentorbase::services::ai::OpenAiCompletion;
use mentorbase::storage::{FsObjectStore, PersistenceStatus};
use mentorbase::{MentorError, MentoringPipeline, OrchestrationLog, SkillProfile};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse()?;
    if args.print_template {
        let template = SkillProfile::new("", "");
        println!("{}", serde_json::to_string_pretty(&template)?);
        return Ok(());
    }
    let profile_path = args
        .profile
        .context("Expected --profile <path>. Run with --help for usage instructions.")?;
    let data = fs::read_to_string(&profile_path)
        .with_context(|| format!("Failed to read profile {}", profile_path.display()))?;
    let profile: SkillProfile = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse profile {}", profile_path.display()))?;

    let paths = ensure_workspace_structure()?;
    let config = load_or_default()?;
    let completion = OpenAiCompletion::from_env(config.completion.clone())?;
    let store = FsObjectStore::new(paths.storage_container(&config));
    let transport = transport_from_settings(&config.notifications, paths.outbox_dir(&config))?;
    let pipeline = MentoringPipeline::new(&completion, &store, transport.as_ref(), &config)
        .with_event_log(OrchestrationLog::for_workspace(&paths));

    let mut session = pipeline.start(profile).map_err(report)?;
    println!("Generating your {} quiz...", config.quiz.domain);
    let quiz = pipeline.generate_quiz(&mut session).map_err(report)?;
    let answers = ask(quiz)?;
    let scored = pipeline
        .submit_answers(&mut session, answers)
        .map_err(report)?;
    println!("\nYour Quiz Score: {}/{}", scored.score(), scored.total());
    for missed in scored.missed() {
        println!("  Missed: {}", missed.question);
        println!("    Correct answer: {}", missed.correct_choice);
    }

    println!("\nPreparing your feedback...");
    let outcome = pipeline.complete(session).map_err(report)?;
    println!("\nFeedback Summary:\n{}", outcome.feedback.summary);
    let project = &outcome.feedback.project;
    println!("\nSuggested project: {}", project.project_title);
    println!("Skills: {}", project.required_skills);
    println!("{}", project.project_details);

    match &outcome.persistence {
        PersistenceStatus::Saved { key, .. } => println!("\nResults saved as {key}"),
        PersistenceStatus::Unsaved { .. } => println!("\nResults were not saved."),
    }
    match &outcome.notification {
        NotificationOutcome::Sent => println!("A follow-up email is on its way."),
        NotificationOutcome::Queued { .. } => {
            println!("Your follow-up email has been queued for delivery.")
        }
        NotificationOutcome::Failed { .. } | NotificationOutcome::Skipped => {}
    }
    for notice in &outcome.notices {
        println!("Note: {notice}");
    }
    Ok(())
}

/// Logs the full error and keeps only the categorized message for the mentee.
fn report(err: MentorError) -> anyhow::Error {
    tracing::error!(kind = err.kind(), error = %err, "Assessment failed");
    anyhow!(err.user_message())
}

fn ask(quiz: &Quiz) -> Result<Vec<String>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers = Vec::with_capacity(quiz.len());
    for (index, question) in quiz.questions().iter().enumerate() {
        print_question(index, question);
        let answer = loop {
            print!("> ");
            io::stdout().flush()?;
            let line = lines
                .next()
                .context("Input closed before the quiz was finished")??;
            match pick(question, line.trim()) {
                Some(choice) => break choice,
                None => println!(
                    "Enter a number between 1 and {}.",
                    question.selectable_choices().len()
                ),
            }
        };
        answers.push(answer);
    }
    Ok(answers)
}

fn print_question(index: usize, question: &QuizQuestion) {
    println!("\nQ{}: {}", index + 1, question.question());
    println!("   ({})", question.sentinel());
    for (n, choice) in question.selectable_choices().iter().enumerate() {
        println!("   {}. {}", n + 1, choice);
    }
}

/// Blank input keeps the default selection, which never scores.
fn pick(question: &QuizQuestion, input: &str) -> Option<String> {
    if input.is_empty() {
        return Some(question.sentinel().to_string());
    }
    let n: usize = input.parse().ok()?;
    question
        .selectable_choices()
        .get(n.checked_sub(1)?)
        .cloned()
}

#[derive(Default)]
struct CliArgs {
    profile: Option<PathBuf>,
    print_template: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--profile" => {
                    let value = args.next().context("Expected a path after --profile")?;
                    parsed.profile = Some(PathBuf::from(value));
                }
                "--print-template" => parsed.print_template = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument '{other}'. Run with --help for usage instructions."
                    ));
                }
            }
        }
        Ok(parsed)
    }
}

fn print_usage() {
    println!("MentorBase assessment");
    println!("Runs a skill quiz for one mentee and sends the follow-up.");
    println!("Usage: cargo run --bin mentor-assess -- [options]");
    println!("Options:");
    println!("  --profile <path>     Self-assessment JSON for the mentee");
    println!("  --print-template     Print a profile template with default ratings");
    println!("Environment:");
    println!("  OPENAI_API_KEY       Completion API key (see [completion].api_key_env)");
    println!("  RUST_LOG             Log filter (default: info)");
}
