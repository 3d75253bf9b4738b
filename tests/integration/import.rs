//! Import scenarios

use crate::common::*;

#[test]
fn red_over_blue_updates_post() {
    let site = demo_site();
    let hooks = Hooks::new();
    let importer = Importer::for_site(&site, &hooks);
    let mut run = importer.begin();

    let ok = run.import_json(
        r#"{"g1":{"color":{"post_types":{"post":{"5":"red"}}}}}"#,
        true,
    );

    assert!(ok);
    assert_eq!(site.value("color", &OwnerRef::post(5)), Some(Value::from("red")));
    assert_eq!(run.buffer().len(), 1);
    assert_eq!(run.buffer().entries()[0].prior, Value::from("blue"));

    let successes: Vec<_> = run
        .log()
        .entries()
        .iter()
        .filter(|e| e.severity == Severity::Success && e.message.starts_with("Successfully"))
        .collect();
    assert_eq!(successes.len(), 1);
    assert!(successes[0].message.contains("color"));
    assert!(successes[0].message.contains('5'));
}

#[test]
fn missing_post_fails_without_touching_store() {
    let site = demo_site();
    let hooks = Hooks::new();
    let importer = Importer::for_site(&site, &hooks);
    let mut run = importer.begin();

    let ok = run.import_json(
        r#"{"g1":{"color":{"post_types":{"post":{"404":"red"}}}}}"#,
        true,
    );

    assert!(!ok);
    assert!(run.buffer().is_empty());
    assert!(site.journal().is_empty());
    let missing: Vec<_> = run
        .log()
        .entries()
        .iter()
        .filter(|e| e.severity == Severity::Error && e.message.contains("does not exist"))
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("404"));
}

#[test]
fn every_owner_kind_is_written() {
    let site = demo_site();
    let outcome = import(
        &site,
        r#"{"g1":{"color":{
            "post_types":{"post":{"6":"p"},"page":{"8":"pg"}},
            "taxonomies":{"category":{"3":"t"}},
            "options":"o",
            "users":{"7":"u"},
            "comments":{"post":{"9":"c"}}
        }}}"#,
        true,
    );

    assert!(outcome.success, "{:?}", outcome.log.render_lines());
    assert_eq!(outcome.stats.written, 6);
    assert_eq!(site.value("color", &OwnerRef::post(8)), Some(Value::from("pg")));
    assert_eq!(site.value("color", &OwnerRef::term("category", 3)), Some(Value::from("t")));
    assert_eq!(site.value("color", &OwnerRef::Option), Some(Value::from("o")));
    assert_eq!(site.value("color", &OwnerRef::user(7)), Some(Value::from("u")));
    assert_eq!(site.value("color", &OwnerRef::comment(9)), Some(Value::from("c")));
    for message in [
        "Successfully updated field \"color\" for category term ID 3.",
        "Successfully updated option \"color\".",
        "Successfully updated field \"color\" for user ID 7.",
        "Successfully updated field \"color\" for comment ID 9 in post type \"post\".",
    ] {
        assert!(outcome.log.contains(message), "missing log line: {}", message);
    }
}

#[test]
fn same_value_is_skipped_not_written() {
    let site = demo_site();
    let outcome = import(
        &site,
        r#"{"g1":{"color":{"post_types":{"post":{"5":"blue","6":"green"}}}}}"#,
        true,
    );
    assert!(outcome.success);
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(outcome.stats.written, 1);
    assert_eq!(outcome.stats.buffered, 2);
    assert!(site.writes_to("color", &OwnerRef::post(5)).is_empty());
}

#[test]
fn type_mismatch_is_not_same_value() {
    let site = demo_site();
    site.set_value("size", &OwnerRef::post(6), Value::Int(0));
    let outcome = import(
        &site,
        r#"{"g1":{"size":{"post_types":{"post":{"6":"0"}}}}}"#,
        true,
    );
    assert!(outcome.success);
    assert_eq!(outcome.stats.written, 1);
    assert_eq!(site.value("size", &OwnerRef::post(6)), Some(Value::from("0")));
}

#[test]
fn object_key_order_does_not_matter() {
    let site = demo_site();
    site.set_value("rows", &OwnerRef::post(6), json(r#"[{"a":"x","b":1}]"#));
    let outcome = import(
        &site,
        r#"{"g1":{"rows":{"post_types":{"post":{"6":[{"b":1,"a":"x"}]}}}}}"#,
        true,
    );
    assert!(outcome.success);
    assert_eq!(outcome.stats.skipped, 1);
    assert!(site.journal().is_empty());
}

#[test]
fn permission_denied_is_reported() {
    let site = demo_site();
    site.deny_edit(6);
    let outcome = import(
        &site,
        r#"{"g1":{"color":{"post_types":{"post":{"6":"red"}}}}}"#,
        true,
    );
    assert!(!outcome.success);
    assert!(outcome.log.contains("Permission denied for post ID 6"));
    assert!(site.journal().is_empty());
}

#[test]
fn malformed_documents_fail_cleanly() {
    let site = demo_site();
    for (document, message) in [
        ("not json at all", "Invalid JSON data"),
        (r#"{"g1": [1, 2]}"#, "Import failed: Invalid data format."),
        (r#"{"g1": {"color": {"users": []}}}"#, "Import failed: Invalid data format."),
    ] {
        let outcome = import(&site, document, true);
        assert!(!outcome.success);
        assert_eq!(outcome.log.len(), 1, "{}", document);
        assert!(outcome.log.contains(message), "{}", document);
    }
    assert!(site.journal().is_empty());
}

#[test]
fn final_status_line_is_last() {
    let site = demo_site();
    let ok = import(&site, r#"{"g1":{"color":{"options":"x"}}}"#, true);
    let last = ok.log.entries().last().unwrap();
    assert_eq!(last.severity, Severity::Success);
    assert_eq!(last.message, "Import process finished. Status: Success");

    let failed = import(&site, r#"{"g1":{"color":{"users":{"1000":"x"}}}}"#, true);
    let last = failed.log.entries().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert_eq!(last.message, "Import process finished. Status: Failed");
}
