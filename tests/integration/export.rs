//! Export scenarios

use crate::common::*;
use fieldsnap::{export_filename, Error};

fn exporter_site() -> MemorySite {
    let site = demo_site();
    site.set_value("color", &OwnerRef::term("category", 3), Value::from("teal"));
    site.set_value("color", &OwnerRef::user(7), Value::from("green"));
    site.set_value("color", &OwnerRef::comment(9), Value::from("grey"));
    site.set_value("color", &OwnerRef::Option, Value::from("navy"));
    site.set_value("size", &OwnerRef::post(6), Value::Int(0));
    site.set_value("size", &OwnerRef::post(8), Value::from(""));
    site.set_value(
        "rows",
        &OwnerRef::post(5),
        json(r#"[{"a":"x","b":1,"stale":true},{"a":null,"b":null}]"#),
    );
    site.set_value(
        "blocks",
        &OwnerRef::post(6),
        json(
            r#"[
                {"acf_fc_layout":"hero","heading":"Hi","body":"ignored"},
                {"acf_fc_layout":"quote","body":"Q"}
            ]"#,
        ),
    );
    site
}

fn everything() -> ExportSelection {
    ExportSelection::groups(["g1"])
        .with_posts("post", vec![5, 6])
        .with_posts("page", vec![8])
        .with_terms("category", vec![3])
        .with_options()
        .with_comments()
        .with_users(vec!["editor".to_string()], vec![])
}

#[test]
fn exports_every_owner_kind() {
    let site = exporter_site();
    let hooks = Hooks::new();
    let document = Exporter::for_site(&site, &hooks).export(&everything());

    let expected = json(
        r#"{"g1":{
            "color":{
                "post_types":{"post":{"5":"blue"}},
                "options":"navy",
                "comments":{"post":{"9":"grey"}},
                "taxonomies":{"category":{"3":"teal"}},
                "users":{"7":"green"}
            },
            "size":{"post_types":{"post":{"6":0}}},
            "rows":{"post_types":{"post":{"5":[{"a":"x","b":1},{}]}}},
            "blocks":{"post_types":{"post":{"6":[
                {"acf_fc_layout":"hero","heading":"Hi"},
                {"acf_fc_layout":"quote","body":"Q"}
            ]}}}
        }}"#,
    );
    let actual = json(&document.to_json().unwrap());
    assert_eq!(actual, expected);
}

#[test]
fn empty_string_is_omitted_but_zero_is_kept() {
    let site = exporter_site();
    let hooks = Hooks::new();
    let document = Exporter::for_site(&site, &hooks)
        .export(&ExportSelection::groups(["g1"]).with_posts("page", vec![8]));
    // page 8 only has an empty size, so nothing survives
    assert!(document.is_empty());

    let document = Exporter::for_site(&site, &hooks)
        .export(&ExportSelection::groups(["g1"]).with_posts("post", vec![6]));
    let size = &document.group("g1").unwrap()["size"];
    assert_eq!(size.post_types.as_ref().unwrap()["post"]["6"], Value::Int(0));
}

#[test]
fn posts_of_another_type_are_not_exported() {
    let site = exporter_site();
    let hooks = Hooks::new();
    let document = Exporter::for_site(&site, &hooks)
        .export(&ExportSelection::groups(["g1"]).with_posts("page", vec![5, 6]));
    assert!(document.is_empty());
}

#[test]
fn unknown_groups_are_skipped() {
    let site = exporter_site();
    let hooks = Hooks::new();
    let document = Exporter::for_site(&site, &hooks)
        .export(&ExportSelection::groups(["nope", "g1"]).with_options());
    let keys: Vec<_> = document.groups().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["g1"]);
}

#[test]
fn export_moves_values_to_another_site() {
    let source = exporter_site();
    let hooks = Hooks::new();
    let document = Exporter::for_site(&source, &hooks).export(&everything());

    let target = demo_site();
    let outcome = Importer::for_site(&target, &hooks).import_document(&document, true);
    assert!(outcome.success, "{:?}", outcome.log.render_lines());
    assert_eq!(target.value("color", &OwnerRef::Option), Some(Value::from("navy")));
    assert_eq!(
        target.value("rows", &OwnerRef::post(5)),
        Some(json(r#"[{"a":"x","b":1},{}]"#))
    );

    // a second pass finds every slot already in place
    target.clear_journal();
    let again = import(&target, &document.to_json_pretty().unwrap(), true);
    assert!(again.success);
    assert_eq!(again.stats.written, 0);
    assert_eq!(again.stats.skipped, again.stats.buffered);
    assert!(target.journal().is_empty());
}

#[test]
fn export_filter_can_drop_values() {
    let site = exporter_site();
    let mut hooks = Hooks::new();
    hooks.add_export_filter(|value, ctx| {
        if ctx.field_name == "color" && ctx.bucket == Some("post") {
            Value::Null
        } else {
            value
        }
    });
    let document = Exporter::for_site(&site, &hooks).export(&everything());
    let color = &document.group("g1").unwrap()["color"];
    assert!(color.post_types.is_none());
    // comments are bucketed by post type too
    assert!(color.comments.is_none());
    assert_eq!(color.options, Some(Value::from("navy")));
}

#[test]
fn invalid_selections_are_rejected() {
    let selection = ExportSelection::default().with_posts("post", vec![]);
    let Err(Error::InvalidInput(message)) = selection.validate() else {
        panic!("expected invalid input");
    };
    let lines: Vec<_> = message.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Please select at least one Field Group.",
            "Please select at least one post ID for post type: post",
        ]
    );

    assert!(ExportSelection::groups(["g1"]).validate().is_err());
    assert!(ExportSelection::groups(["g1"]).with_comments().validate().is_err());
    assert!(everything().validate().is_ok());
}

#[test]
fn filenames_carry_prefix_and_date() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(export_filename("data-export", date), "data-export-2024-03-09.json");
}
