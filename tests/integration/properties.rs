//! Property tests for emptiness and rollback

use crate::common::*;
use fieldsnap::{is_empty, rollback, EventLog};
use indexmap::IndexMap;
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-z0-9]{0,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

fn arb_present_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Int(0)),
        Just(Value::from("0")),
        Just(Value::Float(0.0)),
        Just(Value::Bool(false)),
    ]
}

fn arb_empty() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::from("")),
        Just(Value::Array(vec![])),
        Just(Value::Object(IndexMap::new())),
    ]
}

/// Bury `leaf` under one container per level, next to empty siblings
fn bury(leaf: Value, levels: &[(bool, Value)]) -> Value {
    levels.iter().fold(leaf, |inner, (as_array, sibling)| {
        if *as_array {
            Value::Array(vec![sibling.clone(), inner])
        } else {
            Value::object([("pad", sibling.clone()), ("leaf", inner)])
        }
    })
}

fn post_map(values: &[(u64, Value)]) -> String {
    let pairs: Vec<String> = values
        .iter()
        .map(|(id, v)| format!("\"{}\":{}", id, serde_json::to_string(v).unwrap()))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

proptest! {
    #[test]
    fn falsy_leaf_at_any_depth_is_present(
        leaf in arb_present_scalar(),
        levels in prop::collection::vec((any::<bool>(), arb_empty()), 0..6),
    ) {
        prop_assert!(!is_empty(&bury(leaf, &levels)));
    }

    #[test]
    fn only_empty_leaves_is_empty(
        leaf in arb_empty(),
        levels in prop::collection::vec((any::<bool>(), arb_empty()), 0..6),
    ) {
        prop_assert!(is_empty(&bury(leaf, &levels)));
    }

    #[test]
    fn failed_import_restores_every_slot(
        initial in prop::collection::vec((0usize..2, 0usize..2, arb_value()), 0..4),
        colors in prop::collection::vec((5u64..7, arb_value()), 0..3),
        sizes in prop::collection::vec((5u64..7, arb_value()), 0..3),
    ) {
        let site = demo_site();
        let fields = ["color", "size"];
        let posts = [5, 6];
        for (f, p, v) in &initial {
            if !v.is_null() {
                site.set_value(fields[*f], &OwnerRef::post(posts[*p]), v.clone());
            }
        }
        let before = snapshot_values(&site);

        // post 404 does not exist, so the import always aborts at the end
        let mut sizes = sizes;
        sizes.push((404, Value::from("boom")));
        let document = format!(
            r#"{{"g1":{{"color":{{"post_types":{{"post":{}}}}},"size":{{"post_types":{{"post":{}}}}}}}}}"#,
            post_map(&colors),
            post_map(&sizes),
        );

        let outcome = import(&site, &document, true);
        prop_assert!(!outcome.success);
        prop_assert!(outcome.rollback.map_or(false, |r| r.is_clean()));
        prop_assert_eq!(snapshot_values(&site), before);
    }

    #[test]
    fn replaying_a_buffer_twice_writes_once(
        colors in prop::collection::vec((5u64..7, arb_value()), 1..4),
    ) {
        let site = demo_site();
        let hooks = Hooks::new();
        let importer = Importer::for_site(&site, &hooks);
        let mut run = importer.begin();
        run.import_json(
            &format!(r#"{{"g1":{{"color":{{"post_types":{{"post":{}}}}}}}}}"#, post_map(&colors)),
            false,
        );
        let buffer = run.buffer().clone();
        let before_second = {
            let mut log = EventLog::new();
            rollback(&buffer, &site, &site, &hooks, &mut log);
            snapshot_values(&site)
        };

        site.clear_journal();
        let mut log = EventLog::new();
        let summary = rollback(&buffer, &site, &site, &hooks, &mut log);
        prop_assert_eq!(summary.restored, 0);
        prop_assert!(site.journal().is_empty());
        prop_assert_eq!(snapshot_values(&site), before_second);
    }
}
