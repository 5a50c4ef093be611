use std::fs;

use crate::support::{correct_answers, mentee, RecordingTransport, ScriptedCompletion};
use crate::IntegrationHarness;
use mentorbase::storage::{compute_hash, FsObjectStore, PersistenceStatus};

fn saved_key(status: &PersistenceStatus) -> (String, String) {
    match status {
        PersistenceStatus::Saved { key, sha256 } => (key.clone(), sha256.clone()),
        other => panic!("expected saved record, got {other:?}"),
    }
}

#[test]
fn same_mentee_twice_gets_two_records() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = FsObjectStore::new(harness.paths().storage_container(harness.config()));
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let first = pipeline
        .run(mentee("Ada Lovelace"), correct_answers)
        .unwrap();
    let second = pipeline
        .run(mentee("Ada Lovelace"), |quiz| {
            quiz.questions()
                .iter()
                .map(|q| q.selectable_choices()[2].clone())
                .collect()
        })
        .unwrap();

    assert_ne!(first.session_id, second.session_id);
    let (first_key, _) = saved_key(&first.persistence);
    let (second_key, _) = saved_key(&second.persistence);
    assert_ne!(first_key, second_key);

    let container = harness
        .workspace_path()
        .join("AI")
        .join(&harness.config().storage.container);
    let mut files: Vec<_> = fs::read_dir(&container)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    let mut expected = vec![first_key, second_key];
    expected.sort();
    assert_eq!(files, expected);

    // The first session's record is untouched by the second.
    let (key, _) = saved_key(&first.persistence);
    let record: serde_json::Value =
        serde_json::from_slice(&fs::read(container.join(&key)).unwrap()).unwrap();
    assert_eq!(record["score"], 10);
}

#[test]
fn record_is_self_describing_and_hashed() {
    let harness = IntegrationHarness::new();
    let completion = ScriptedCompletion::healthy(10);
    let store = FsObjectStore::new(harness.paths().storage_container(harness.config()));
    let transport = RecordingTransport::default();
    let pipeline = harness.pipeline(&completion, &store, &transport);

    let outcome = pipeline
        .run(mentee("Grace Hopper"), |quiz| {
            let mut answers = correct_answers(quiz);
            answers[3] = quiz.questions()[3].selectable_choices()[1].clone();
            answers
        })
        .unwrap();
    let (key, sha256) = saved_key(&outcome.persistence);
    assert!(key.starts_with("mentee_result_Grace_Hopper_"));
    assert!(key.ends_with(".json"));

    let bytes = fs::read(store.object_path(&key).unwrap()).unwrap();
    assert_eq!(compute_hash(&bytes), sha256);

    let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(record["session_id"], outcome.session_id.to_string());
    assert_eq!(record["storage_key"], key);
    assert_eq!(record["score"], 9);
    assert_eq!(record["total_questions"], 10);
    assert_eq!(record["self_assessment"]["name"], "Grace Hopper");
    assert_eq!(record["self_assessment"]["technical_skills"]["SQL"], 4);
    assert_eq!(record["quiz"]["answers"][3]["correct"], false);
    assert_eq!(
        record["quiz"]["answers"][3]["correct_answer"],
        "Correct statement 4"
    );
    assert_eq!(record["feedback_summary"], outcome.feedback.summary);
    assert_eq!(
        record["project_suggestion"]["project_title"],
        "Transit Delay Warehouse"
    );
    assert!(record["timestamp"].is_string());
}
