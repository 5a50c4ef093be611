use crate::support::{
    correct_answers, mentee, MemoryStore, PromptKind, RecordingTransport, ScriptedCompletion,
    SUMMARY_TEXT,
};
use crate::IntegrationHarness;
use mentorbase::orchestration::EventType;
use mentorbase::notifications::NotificationOutcome;
use mentorbase::{MentorError, SessionState};

#[test]
fn perfect_score_flows_through_every_stage() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let mut session = pipeline.start(mentee("Ada Lovelace")).unwrap();
    let started_at = session.started_at();
    let quiz_prompt = {
        let quiz = pipeline.generate_quiz(&mut session).unwrap();
        assert_eq!(quiz.len(), 10);
        completion.last_prompt(PromptKind::Quiz).unwrap()
    };
    assert!(quiz_prompt.contains("SQL: 4/5"));
    assert!(quiz_prompt.contains("Python: 2/5"));
    assert_eq!(session.state(), SessionState::QuizGenerated);
    // Project recommendation is only requested after scoring.
    assert_eq!(completion.calls(PromptKind::Project), 0);

    let answers = correct_answers(session.quiz().unwrap());
    let scored = pipeline.submit_answers(&mut session, answers).unwrap();
    assert_eq!((scored.score(), scored.total()), (10, 10));
    assert_eq!(session.state(), SessionState::Scored);

    let outcome = pipeline.complete(session).unwrap();
    assert_eq!(outcome.state, SessionState::Notified);
    assert_eq!(outcome.started_at, started_at);
    assert!(outcome.finished_at >= outcome.started_at);
    assert_eq!((outcome.score, outcome.total), (10, 10));
    assert_eq!(outcome.feedback.summary, SUMMARY_TEXT);
    assert!(!outcome.feedback.summary_fallback);
    assert_eq!(outcome.feedback.project.project_title, "Transit Delay Warehouse");
    assert!(outcome.is_saved());
    assert_eq!(outcome.notification, NotificationOutcome::Sent);
    assert!(outcome.notices.is_empty());

    let summary_prompt = completion.last_prompt(PromptKind::Summary).unwrap();
    assert!(summary_prompt.contains("10/10"));
    assert_eq!(completion.calls(PromptKind::Summary), 1);
    assert_eq!(completion.calls(PromptKind::Project), 1);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "mentee@example.com");
    assert!(sent[0].body.contains("Your Quiz Score: 10/10"));
    assert!(sent[0].body.contains(SUMMARY_TEXT));
    assert_eq!(transport.closes(), 1);

    let events: Vec<_> = harness
        .event_log()
        .load_session_events(outcome.session_id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        events,
        vec![
            EventType::SessionStarted,
            EventType::QuizGenerated,
            EventType::QuizScored,
            EventType::FeedbackSynthesized,
            EventType::SessionRecorded,
            EventType::NotificationSent,
        ]
    );
}

#[test]
fn short_answer_list_is_rejected_without_feedback_calls() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let mut session = pipeline.start(mentee("Grace Hopper")).unwrap();
    pipeline.generate_quiz(&mut session).unwrap();
    let mut answers = correct_answers(session.quiz().unwrap());
    answers.pop();

    let err = pipeline
        .submit_answers(&mut session, answers.clone())
        .unwrap_err();
    assert!(matches!(
        err,
        MentorError::AnswerCountMismatch {
            expected: 10,
            received: 9
        }
    ));
    assert_eq!(session.state(), SessionState::QuizGenerated);
    assert!(session.scored().is_none());
    assert_eq!(completion.calls(PromptKind::Summary), 0);
    assert_eq!(completion.calls(PromptKind::Project), 0);
    assert_eq!(store.attempts(), 0);

    // The same quiz can still be answered in full.
    answers.push(
        session.quiz().unwrap().questions()[9]
            .selectable_choices()[1]
            .clone(),
    );
    let scored = pipeline.submit_answers(&mut session, answers).unwrap();
    assert_eq!(scored.score(), 9);
}

#[test]
fn unparseable_quiz_aborts_before_side_effects() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10).with_quiz(Ok(
        "Sure! Here are ten great questions about data engineering.".into(),
    ));
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let mut session = pipeline.start(mentee("Alan Turing")).unwrap();
    let err = pipeline.generate_quiz(&mut session).unwrap_err();
    assert!(matches!(err, MentorError::MalformedGeneration(_)));
    assert_eq!(session.state(), SessionState::Aborted);
    assert!(session.quiz().is_none());

    assert_eq!(completion.total_calls(), 1);
    assert_eq!(store.attempts(), 0);
    assert_eq!(transport.connects(), 0);

    let events = harness
        .event_log()
        .load_session_events(session.session_id())
        .unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.event_type, EventType::SessionAborted);
    assert_eq!(last.details["kind"], "malformed_generation");
}

#[test]
fn quiz_with_too_few_questions_is_malformed() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(7);
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let mut answered = false;
    let err = pipeline
        .run(mentee("Edsger Dijkstra"), |quiz| {
            answered = true;
            correct_answers(quiz)
        })
        .unwrap_err();
    assert!(matches!(err, MentorError::MalformedGeneration(_)));
    assert!(!answered);
    assert_eq!(store.attempts(), 0);
    assert_eq!(transport.connects(), 0);
}

#[test]
fn run_uses_configured_question_count() {
    let mut harness = IntegrationHarness::new();
    harness.config_mut().quiz.question_count = 5;
    let completion = ScriptedCompletion::healthy(5);
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Barbara Liskov"), |quiz| {
            let mut answers = correct_answers(quiz);
            answers[0] = quiz.questions()[0].sentinel().to_string();
            answers
        })
        .unwrap();
    assert_eq!((outcome.score, outcome.total), (4, 5));
    assert!(completion
        .last_prompt(PromptKind::Quiz)
        .unwrap()
        .contains("exactly 5 multiple-choice"));
    assert!(completion
        .last_prompt(PromptKind::Summary)
        .unwrap()
        .contains("(4/5)"));
}
