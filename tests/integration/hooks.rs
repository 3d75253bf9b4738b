//! Hook dispatch during import, rollback and export

use crate::common::*;
use fieldsnap::FieldType;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn successful_import_notifies_in_document_order() {
    let site = demo_site();
    let recorder = Recorder::new();
    let hooks = recorder.hooks();

    let outcome = Importer::for_site(&site, &hooks).import(
        r#"{"g1":{
            "color":{"post_types":{"post":{"5":"blue","6":"red"}},"users":{"7":"u"}},
            "size":{"options":"L"}
        }}"#,
        true,
    );

    assert!(outcome.success);
    // post 5 already holds "blue": no notification for it
    assert_eq!(
        recorder.calls(),
        vec![
            "import_started",
            "imported color@6",
            "imported color@user_7",
            "imported size@option",
            "import_completed",
        ]
    );
}

#[test]
fn export_notifies_once_before_and_after() {
    let site = demo_site();
    let recorder = Recorder::new();
    let hooks = recorder.hooks();

    let document = Exporter::for_site(&site, &hooks).export(
        &ExportSelection::groups(["nope", "g1"]).with_posts("post", vec![5, 6]),
    );

    assert_eq!(document.len(), 1);
    assert_eq!(
        recorder.calls(),
        vec!["export_started nope,g1", "export_finished 1"]
    );
}

#[test]
fn failed_import_without_rollback_skips_rollback_hooks() {
    let site = demo_site();
    let recorder = Recorder::new();
    let hooks = recorder.hooks();

    Importer::for_site(&site, &hooks).import(
        r#"{"g1":{"color":{"post_types":{"post":{"6":"red","77":"x"}}}}}"#,
        false,
    );

    assert_eq!(
        recorder.calls(),
        vec!["import_started", "imported color@6", "import_failed"]
    );
}

#[test]
fn rollback_failure_is_reported_per_slot() {
    let site = demo_site();
    site.inject_fault("color", &OwnerRef::post(6), WriteFault::Spurious);
    let recorder = Recorder::new();
    let hooks = recorder.hooks();

    let importer = Importer::for_site(&site, &hooks);
    let mut run = importer.begin();
    assert!(run.import_json(r#"{"g1":{"color":{"post_types":{"post":{"6":"red"}}}}}"#, true));
    site.inject_fault("color", &OwnerRef::post(6), WriteFault::Reject);
    run.import_json(r#"{"g1":{"color":{"users":{"404":"x"}}}}"#, true);
    let outcome = run.finish();

    assert!(!outcome.success);
    assert_eq!(site.value("color", &OwnerRef::post(6)), Some(Value::from("red")));
    let summary = outcome.rollback.unwrap();
    assert_eq!(summary.failed, 1);
    assert!(recorder
        .calls()
        .contains(&"rollback_failed color@6".to_string()));
}

#[test]
fn import_filter_sees_existing_value_and_context() {
    let site = demo_site();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let mut hooks = Hooks::new();
    hooks.add_import_filter(move |incoming, existing, ctx| {
        log.borrow_mut().push((
            ctx.kind.to_string(),
            ctx.bucket.map(str::to_string),
            existing.clone(),
        ));
        match incoming {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        }
    });

    let outcome = Importer::for_site(&site, &hooks).import(
        r#"{"g1":{"color":{
            "post_types":{"post":{"5":"red"}},
            "comments":{"post":{"9":"c"}}
        }}}"#,
        true,
    );

    assert!(outcome.success);
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("RED")));
    assert_eq!(site.value("color", &OwnerRef::comment(9)), Some(Value::from("C")));
    let seen = seen.borrow();
    assert_eq!(seen[0].1.as_deref(), Some("post"));
    assert_eq!(seen[0].2, Value::from("blue"));
    assert_eq!(seen[1].0, "comment");
    assert_eq!(seen[1].2, Value::Null);
}

#[test]
fn import_filter_can_turn_a_change_into_a_skip() {
    let site = demo_site();
    let mut hooks = Hooks::new();
    hooks.add_import_filter(|_, existing, _| existing.clone());

    let outcome = Importer::for_site(&site, &hooks).import(
        r#"{"g1":{"color":{"post_types":{"post":{"5":"red"}}}}}"#,
        true,
    );

    assert!(outcome.success);
    assert_eq!(outcome.stats.skipped, 1);
    assert!(site.journal().is_empty());
}

#[test]
fn shaping_filter_makes_text_fields_shaped() {
    let mut hooks = Hooks::new();
    hooks.add_shaping_filter(|mut types, def| {
        if def.name == "color" {
            types.push(FieldType::Other("text".to_string()));
        }
        types
    });
    let normalizer = fieldsnap::Normalizer::new(&hooks);
    let group = demo_group();
    assert!(normalizer.requires_shaping(group.field("color")));
    assert!(!normalizer.requires_shaping(group.field("size")));
    assert!(normalizer.requires_shaping(group.field("rows")));
}
