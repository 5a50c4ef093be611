use crate::support::{
    correct_answers, mentee, MemoryStore, RecordingTransport, ScriptedCompletion, SUMMARY_TEXT,
};
use crate::IntegrationHarness;
use mentorbase::learning::feedback::GENERATION_FAILED_MARKER;
use mentorbase::notifications::{NotificationOutcome, OutboxTransport};
use mentorbase::orchestration::EventType;
use mentorbase::storage::PersistenceStatus;
use mentorbase::{MentorError, PersistenceError, SessionState};

#[test]
fn storage_failure_still_delivers_feedback_and_email() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = MemoryStore::failing();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Ada Lovelace"), correct_answers)
        .unwrap();

    assert_eq!(outcome.state, SessionState::Notified);
    assert_eq!(outcome.score, 10);
    assert_eq!(outcome.feedback.summary, SUMMARY_TEXT);
    assert!(!outcome.is_saved());
    match &outcome.persistence {
        PersistenceStatus::Unsaved { error } => {
            assert!(error.key.starts_with("mentee_result_Ada_Lovelace_"));
            assert!(error.reason.contains("503"));
        }
        other => panic!("expected unsaved record, got {other:?}"),
    }
    assert_eq!(store.attempts(), 1);

    assert_eq!(outcome.notification, NotificationOutcome::Sent);
    assert_eq!(transport.sent().len(), 1);

    let unsaved_notice = MentorError::Persistence(PersistenceError {
        key: String::new(),
        reason: String::new(),
    })
    .user_message();
    assert_eq!(outcome.notices, vec![unsaved_notice.to_string()]);
    // Raw transport text never reaches the mentee.
    assert!(outcome.notices.iter().all(|n| !n.contains("503")));

    let events: Vec<_> = harness
        .event_log()
        .load_session_events(outcome.session_id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert!(events.contains(&EventType::SessionUnsaved));
    assert!(!events.contains(&EventType::SessionRecorded));
}

#[test]
fn email_failure_is_reported_not_raised() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = MemoryStore::default();
    let transport = RecordingTransport::failing();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Katherine Johnson"), correct_answers)
        .unwrap();

    assert_eq!(outcome.state, SessionState::Notified);
    assert!(outcome.is_saved());
    match &outcome.notification {
        NotificationOutcome::Failed { reason } => assert!(reason.contains("535")),
        other => panic!("expected failed notification, got {other:?}"),
    }
    // One attempt, and the connection is closed even though send failed.
    assert_eq!(transport.connects(), 1);
    assert_eq!(transport.closes(), 1);
    assert_eq!(outcome.notices.len(), 1);
    assert!(!outcome.notices[0].contains("535"));
}

#[test]
fn feedback_failures_degrade_to_marked_placeholders() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10)
        .with_summary(Err("connection reset by peer".into()))
        .with_project(Ok("I'd suggest building a dashboard!".into()));
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Margaret Hamilton"), correct_answers)
        .unwrap();

    assert!(outcome.feedback.summary_fallback);
    assert!(!outcome.feedback.summary.is_empty());
    assert!(outcome.feedback.project.generation_failed);
    assert!(outcome
        .feedback
        .project
        .project_title
        .contains(GENERATION_FAILED_MARKER));
    assert_eq!(outcome.notices.len(), 1);

    // The record is still written, carrying both fallback flags.
    let key = store.keys().pop().unwrap();
    let record = store.object(&key).unwrap();
    assert_eq!(record["summary_fallback"], true);
    assert_eq!(record["project_suggestion"]["generation_failed"], true);
    assert_eq!(outcome.notification, NotificationOutcome::Sent);
}

#[test]
fn disabled_notifications_skip_the_transport() {
    let mut harness = IntegrationHarness::new();
    harness.config_mut().notifications.enabled = false;
    let completion = ScriptedCompletion::healthy(10);
    let store = MemoryStore::default();
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Frances Allen"), correct_answers)
        .unwrap();

    assert_eq!(outcome.notification, NotificationOutcome::Skipped);
    assert_eq!(outcome.state, SessionState::Notified);
    assert_eq!(transport.connects(), 0);
    assert!(outcome.notices.is_empty());

    let last = harness
        .event_log()
        .load_session_events(outcome.session_id)
        .unwrap()
        .pop()
        .unwrap();
    assert_eq!(last.event_type, EventType::NotificationSkipped);
}

#[test]
fn outbox_spooling_is_reported_as_queued() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = MemoryStore::default();
    let transport = OutboxTransport::new(harness.paths().outbox_dir(harness.config()));
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Barbara Liskov"), correct_answers)
        .unwrap();

    let NotificationOutcome::Queued { spool_path } = &outcome.notification else {
        panic!("expected queued mail, got {:?}", outcome.notification);
    };
    let spooled = std::fs::read_to_string(spool_path).unwrap();
    assert!(spooled.contains("To: mentee@example.com"));
    assert!(outcome.notices.is_empty());

    let last = harness
        .event_log()
        .load_session_events(outcome.session_id)
        .unwrap()
        .pop()
        .unwrap();
    assert_eq!(last.event_type, EventType::NotificationQueued);
    assert_eq!(last.details["spool_path"], spool_path.as_str());
}
