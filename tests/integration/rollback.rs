//! Rollback after an aborted import

use crate::common::*;
use fieldsnap::{rollback, EventLog, RollbackBuffer, RollbackEntry};

#[test]
fn negative_id_in_second_field_restores_first_field_only() {
    let site = demo_site();
    site.set_value("size", &OwnerRef::post(6), Value::from("M"));
    let before = snapshot_values(&site);

    let outcome = import(
        &site,
        r#"{"g1":{
            "color":{"post_types":{"post":{"5":"red"}}},
            "size":{"post_types":{"post":{"-3":"L","6":"XL"}}}
        }}"#,
        true,
    );

    assert!(!outcome.success);
    assert_eq!(snapshot_values(&site), before);
    // only the color write happened, then it was compensated
    let writes: Vec<_> = site
        .journal()
        .into_iter()
        .map(|w| (w.field, w.owner, w.value))
        .collect();
    assert_eq!(
        writes,
        vec![
            ("color".to_string(), "5".to_string(), Value::from("red")),
            ("color".to_string(), "5".to_string(), Value::from("blue")),
        ]
    );
    assert_eq!(outcome.stats.rolled_back, 1);
}

#[test]
fn abort_stops_later_groups() {
    let site = demo_site();
    let outcome = import(
        &site,
        r#"{
            "g1":{"color":{"post_types":{"post":{"6":"one"}}}},
            "g2":{"color":{"users":{"999":"two"}}},
            "g3":{"color":{"options":"three"}}
        }"#,
        false,
    );

    assert!(!outcome.success);
    assert_eq!(site.value("color", &OwnerRef::post(6)), Some(Value::from("one")));
    assert_eq!(site.value("color", &OwnerRef::Option), None);
    assert!(outcome.log.contains("Importing group: \"g2\""));
    assert!(!outcome.log.contains("Importing group: \"g3\""));
}

#[test]
fn rollback_restores_absent_values_to_absent() {
    let site = demo_site();
    let outcome = import(
        &site,
        r#"{"g1":{
            "size":{"post_types":{"post":{"6":"L"}}, "options":"global"},
            "color":{"users":{"1234":"x"}}
        }}"#,
        true,
    );

    assert!(!outcome.success);
    assert_eq!(site.value("size", &OwnerRef::post(6)), None);
    assert_eq!(site.value("size", &OwnerRef::Option), None);
    assert_eq!(outcome.stats.rolled_back, 2);
}

#[test]
fn genuine_write_failure_rolls_back_earlier_writes() {
    let site = demo_site();
    site.inject_fault("size", &OwnerRef::Option, WriteFault::Reject);
    let recorder = Recorder::new();
    let hooks = recorder.hooks();

    let outcome = Importer::for_site(&site, &hooks).import(
        r#"{"g1":{
            "color":{"post_types":{"post":{"5":"red","6":"red"}}},
            "size":{"options":"L"}
        }}"#,
        true,
    );

    assert!(!outcome.success);
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("blue")));
    assert_eq!(site.value("color", &OwnerRef::post(6)), None);
    assert_eq!(
        recorder.calls(),
        vec![
            "import_started",
            "imported color@5",
            "imported color@6",
            "failed size@option",
            "before_rollback 3",
            "rolled_back color@5",
            "rolled_back color@6",
            "after_rollback 2",
            "import_failed",
        ]
    );
    let tail: Vec<_> = outcome
        .log
        .entries()
        .iter()
        .rev()
        .take(2)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        tail,
        vec![
            "Import process finished. Status: Failed",
            "Changes rolled back due to import failure.",
        ]
    );
}

#[test]
fn disabled_rollback_leaves_partial_writes() {
    let site = demo_site();
    let recorder = Recorder::new();
    let hooks = recorder.hooks();

    let outcome = Importer::for_site(&site, &hooks).import(
        r#"{"g1":{"color":{"post_types":{"post":{"5":"red","0":"x"}}}}}"#,
        false,
    );

    assert!(!outcome.success);
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("red")));
    assert!(outcome.rollback.is_none());
    assert!(!recorder.calls().iter().any(|c| c.starts_with("before_rollback")));
}

#[test]
fn rollback_failure_does_not_stop_replay() {
    let site = demo_site();
    site.set_value("size", &OwnerRef::post(6), Value::from("S"));
    let hooks = Hooks::new();
    let importer = Importer::for_site(&site, &hooks);
    let mut run = importer.begin();

    let ok = run.import_json(
        r#"{"g1":{
            "color":{"post_types":{"post":{"5":"red"}}},
            "size":{"post_types":{"post":{"6":"L"}}}
        }}"#,
        false,
    );
    assert!(ok);
    let buffer = run.buffer().clone();
    drop(run.finish());

    // color can no longer be written back; size can
    site.inject_fault("color", &OwnerRef::post(5), WriteFault::Reject);
    let mut log = EventLog::new();
    let summary = rollback(&buffer, &site, &site, &hooks, &mut log);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.restored, 1);
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("red")));
    assert_eq!(site.value("size", &OwnerRef::post(6)), Some(Value::from("S")));
    assert!(log.contains("Failed to rollback field \"color\" for post ID 5."));
    assert!(log.contains("Rolled back field \"size\" for post ID 6."));
}

#[test]
fn replay_twice_is_a_no_op() {
    let site = demo_site();
    let hooks = Hooks::new();
    let importer = Importer::for_site(&site, &hooks);
    let mut run = importer.begin();
    run.import_json(
        r#"{
            "g1":{"color":{"post_types":{"post":{"5":"red"}}}},
            "g2":{"color":{"post_types":{"post":{"5":"green"}}}}
        }"#,
        false,
    );
    let buffer = run.buffer().clone();
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.entries()[1].prior, Value::from("red"));

    let mut log = EventLog::new();
    let first = rollback(&buffer, &site, &site, &hooks, &mut log);
    assert_eq!(first.restored, 1);
    assert_eq!(first.superseded, 1);
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("blue")));

    site.clear_journal();
    let second = rollback(&buffer, &site, &site, &hooks, &mut log);
    assert_eq!(second.restored, 0);
    assert!(site.journal().is_empty());
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("blue")));
}

#[test]
fn manual_buffer_replays_in_order() {
    let site = demo_site();
    site.set_value("color", &OwnerRef::user(7), Value::from("now"));
    site.set_value("color", &OwnerRef::term("category", 3), Value::from("now"));

    let mut buffer = RollbackBuffer::new();
    for owner in [OwnerRef::term("category", 3), OwnerRef::user(7)] {
        buffer.record(RollbackEntry {
            group_key: "g1".to_string(),
            field_name: "color".to_string(),
            owner,
            bucket: None,
            prior: Value::from("then"),
        });
    }

    let hooks = Hooks::new();
    let mut log = EventLog::new();
    rollback(&buffer, &site, &site, &hooks, &mut log);

    let owners: Vec<_> = site.journal().into_iter().map(|w| w.owner).collect();
    assert_eq!(owners, vec!["category_3", "user_7"]);
}
