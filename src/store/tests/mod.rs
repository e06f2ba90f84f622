//! Unit tests for the store module
//! No filesystem or environment dependencies.

#![allow(clippy::panic)]

use std::time::{Duration, Instant};

use serde_json::{Map, Value, json};

use super::{
    OptionsUpdate, PathResolver, PropertyStore, SetOptions, StoreOptions,
    index::{Location, ReferenceIndex},
    is_plain_object,
    tree::PropertyTree,
};
use crate::StoreError;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected object, got {other}"),
    }
}

/// Walks the tree for every indexed path and checks both agree.
fn assert_index_matches_tree(store: &PropertyStore) {
    let resolver = PathResolver::new(&store.options().separator);

    for path in store.paths() {
        let walked = resolver
            .split(path)
            .iter()
            .try_fold(store.tree(), |node, segment| node.as_object()?.get(*segment));

        assert_eq!(walked, store.get(path), "index out of sync at '{path}'");
    }
}

mod reads_and_writes {
    use super::*;

    #[test]
    fn gets_root_properties() {
        let mut store = PropertyStore::new();

        assert!(store.set("foo", json!("bar")));

        assert_eq!(store.get("foo"), Some(&json!("bar")));
        assert!(store.has("foo"));
        assert!(!store.has("bar"));
        assert_eq!(store.get("bar"), None);
    }

    #[test]
    fn creates_missing_ancestors() {
        let mut store = PropertyStore::new();

        store.set("nested.property.foo", json!("bar"));

        assert_eq!(store.get("nested.property.foo"), Some(&json!("bar")));
        assert_eq!(store.get("nested.property"), Some(&json!({ "foo": "bar" })));
        assert_eq!(
            store.get("nested"),
            Some(&json!({ "property": { "foo": "bar" } }))
        );
        assert_index_matches_tree(&store);
    }

    #[test]
    fn overwrite_replaces_whole_subtree() {
        let mut store = PropertyStore::new();

        store.set("overwrite", json!({ "a": 1, "b": 2 }));
        store.set("overwrite", json!({ "a": 2, "c": 2 }));

        assert_eq!(store.get("overwrite"), Some(&json!({ "a": 2, "c": 2 })));
        assert_eq!(store.get("overwrite.b"), None);
        assert!(!store.has("overwrite.b"));

        store.set("overwrite.d", json!(5));

        assert_eq!(
            store.get("overwrite"),
            Some(&json!({ "a": 2, "c": 2, "d": 5 }))
        );
        assert_eq!(store.get("overwrite.a"), Some(&json!(2)));
        assert_eq!(store.get("overwrite.c"), Some(&json!(2)));
        assert_eq!(store.get("overwrite.d"), Some(&json!(5)));
        assert_index_matches_tree(&store);
    }

    #[test]
    fn overwriting_object_with_leaf_drops_descendants() {
        let mut store = PropertyStore::new();

        store.set("server", json!({ "http": { "port": 80 } }));
        store.set("server", json!("disabled"));

        assert_eq!(store.get("server"), Some(&json!("disabled")));
        assert!(!store.has("server.http"));
        assert!(!store.has("server.http.port"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn leaf_ancestor_is_replaced_by_object() {
        let mut store = PropertyStore::new();

        store.set("a", json!("scalar"));
        assert!(store.set("a.b", json!(1)));

        assert_eq!(store.get("a"), Some(&json!({ "b": 1 })));
        assert_eq!(store.tree(), &json!({ "a": { "b": 1 } }));
        assert_index_matches_tree(&store);
    }

    #[test]
    fn ancestors_see_writes_below_them() {
        let mut store = PropertyStore::new();

        store.set("a.b", json!(1));
        store.set("a.c", json!(2));
        store.set("a.d.e", json!(3));

        assert_eq!(store.get("a"), Some(&json!({ "b": 1, "c": 2, "d": { "e": 3 } })));
        assert_eq!(store.get("a.d"), Some(&json!({ "e": 3 })));
        assert_index_matches_tree(&store);
    }

    #[test]
    fn textual_prefix_siblings_survive_invalidation() {
        let mut store = PropertyStore::new();

        store.set("a", json!({ "x": 1 }));
        store.set("ab", json!({ "y": 2 }));
        store.set("a", json!(0));

        assert_eq!(store.get("ab.y"), Some(&json!(2)));
        assert!(!store.has("a.x"));
    }

    #[test]
    fn arrays_are_opaque_leaves() {
        let mut store = PropertyStore::new();

        store.set("list", json!([1, { "a": 1 }]));

        assert_eq!(store.get("list"), Some(&json!([1, { "a": 1 }])));
        assert!(!store.has("list.0"));
        assert!(!store.has("list.1.a"));
    }

    #[test]
    fn references_disabled_indexes_only_the_path() {
        let mut store = PropertyStore::new();

        store.set_with(
            "x",
            json!({ "a": { "b": 1 } }),
            SetOptions { references: false },
        );

        assert!(store.has("x"));
        assert!(!store.has("x.a"));
        assert!(!store.has("x.a.b"));
        assert_eq!(store.tree(), &json!({ "x": { "a": { "b": 1 } } }));
    }

    #[test]
    fn overwrite_drops_paths_written_below_unindexed_parent() {
        let mut store = PropertyStore::new();
        store.set_with("x", json!({ "a": { "b": 1 } }), SetOptions { references: false });
        store.set("x.a.c", json!(2));

        assert!(store.has("x.a.c"));

        store.set("x.a", json!(5));

        assert!(!store.has("x.a.c"));
        assert_eq!(store.get("x"), Some(&json!({ "a": 5 })));
    }

    #[test]
    fn nested_keys_containing_separator_resolve() {
        let mut store = PropertyStore::new();

        store.set("x", json!({ "b.c": 1 }));

        assert_eq!(store.get("x.b.c"), Some(&json!(1)));
        assert!(!store.has("x.b"));

        store.set("x.b", json!(5));

        assert_eq!(store.get("x.b"), Some(&json!(5)));
        assert_eq!(store.get("x.b.c"), Some(&json!(1)));
        assert_eq!(store.tree(), &json!({ "x": { "b.c": 1, "b": 5 } }));
    }

    #[test]
    fn large_child_scope_load_is_not_quadratic() {
        let count = 20_000;
        let entries: Map<String, Value> = (0..count)
            .map(|i| (format!("key{i}"), json!({ "value": i })))
            .collect();
        let mut store = PropertyStore::new();

        let started = Instant::now();
        store.child("cfg").assign_merge(entries);
        let elapsed = started.elapsed();

        assert_eq!(store.get("cfg.key19999.value"), Some(&json!(19_999)));
        assert_eq!(
            store.get("cfg").and_then(Value::as_object).map(Map::len),
            Some(count)
        );
        assert_eq!(store.len(), 1 + 2 * count);
        assert!(
            elapsed < Duration::from_secs(10),
            "loading {count} keys into a child scope took {elapsed:?}"
        );
    }

    #[test]
    fn empty_segments_are_literal_keys() {
        let mut store = PropertyStore::new();

        store.set("a..b", json!(1));

        assert_eq!(store.tree(), &json!({ "a": { "": { "b": 1 } } }));
        assert_eq!(store.get("a."), Some(&json!({ "b": 1 })));
        assert_index_matches_tree(&store);
    }

    #[test]
    fn tree_is_the_root_container() {
        let mut store = PropertyStore::new();
        assert_eq!(store.tree(), &json!({}));
        assert!(store.is_empty());

        store.set("foo", json!("bar"));

        assert_eq!(store.tree(), &json!({ "foo": "bar" }));
        assert!(!store.has(""));
    }
}

mod assign {
    use super::*;

    #[test]
    fn matches_source_object() {
        let mut store = PropertyStore::new();
        let source = json!({
            "foo": "bar",
            "nested": { "property": { "foo": "bar" } }
        });

        store.assign(object(source.clone()));

        assert_eq!(store.tree(), &source);
        assert_eq!(store.get("foo"), Some(&json!("bar")));
        assert_eq!(store.get("nested.property.foo"), Some(&json!("bar")));
        assert_index_matches_tree(&store);
    }

    #[test]
    fn leaves_other_top_level_keys_alone() {
        let mut store = PropertyStore::new();
        store.set("kept", json!(true));
        store.set("nested", json!({ "old": 1 }));

        store.assign(object(json!({ "nested": { "new": 2 } })));

        assert_eq!(store.get("kept"), Some(&json!(true)));
        assert_eq!(store.get("nested"), Some(&json!({ "new": 2 })));
        assert!(!store.has("nested.old"));
    }
}

mod options {
    use super::*;

    #[test]
    fn new_separator_applies_to_later_paths() {
        let mut store = PropertyStore::new();
        store.set_options(OptionsUpdate::separator(":")).unwrap();

        store.assign(object(json!({
            "foo": "bar",
            "nested": { "property": { "foo": "bar" } }
        })));
        store.set("new:separator:value", json!(1));

        assert_eq!(store.get("nested:property:foo"), Some(&json!("bar")));
        assert_eq!(store.get("new:separator"), Some(&json!({ "value": 1 })));
        assert_index_matches_tree(&store);
    }

    #[test]
    fn separator_change_does_not_rekey() {
        let mut store = PropertyStore::new();
        store.set("a.b", json!(1));

        store.set_options(OptionsUpdate::separator("/")).unwrap();

        assert_eq!(store.get("a.b"), Some(&json!(1)));
        assert_eq!(store.get("a/b"), None);
    }

    #[test]
    fn empty_separator_is_rejected() {
        let mut store = PropertyStore::new();

        let result = store.set_options(OptionsUpdate::separator(""));

        assert!(matches!(result, Err(StoreError::InvalidSeparator { .. })));
        assert_eq!(store.options().separator, ".");
    }

    #[test]
    fn empty_update_keeps_options() {
        let mut store = PropertyStore::new();

        store.set_options(OptionsUpdate::default()).unwrap();

        assert_eq!(store.options(), &StoreOptions::default());
    }

    #[test]
    fn options_from_toml() {
        let options = StoreOptions::from_toml_str(r#"separator = "/""#).unwrap();
        let store = PropertyStore::with_options(options).unwrap();

        assert_eq!(store.options().separator, "/");
        assert_eq!(
            StoreOptions::from_toml_str("").unwrap(),
            StoreOptions::default()
        );
        assert!(matches!(
            StoreOptions::from_toml_str(r#"separator = """#),
            Err(StoreError::InvalidSeparator { .. })
        ));
        assert!(matches!(
            StoreOptions::from_toml_str("separator = "),
            Err(StoreError::TomlParse { .. })
        ));
    }
}

mod sealing {
    use super::*;

    #[test]
    fn sealed_leaf_keeps_its_value() {
        let mut store = PropertyStore::new();
        store.set("foo", json!("bar"));

        store.seal("foo");

        assert!(!store.set("foo", json!("notbar")));
        assert_eq!(store.get("foo"), Some(&json!("bar")));
        assert!(store.is_sealed("foo"));
    }

    #[test]
    fn sealing_absent_path_does_nothing() {
        let mut store = PropertyStore::new();

        store.seal("missing");

        assert!(!store.is_sealed("missing"));
        assert!(store.set("missing", json!(1)));
    }

    #[test]
    fn null_and_falsy_values_can_be_sealed() {
        let mut store = PropertyStore::new();
        store.set("nothing", Value::Null);
        store.set("zero", json!(0));

        store.seal("nothing");
        store.seal("zero");

        assert!(!store.set("nothing", json!(1)));
        assert!(!store.set("zero", json!(1)));
        assert_eq!(store.get("nothing"), Some(&Value::Null));
        assert_eq!(store.get("zero"), Some(&json!(0)));
    }

    #[test]
    fn sealed_object_cannot_gain_keys() {
        let mut store = PropertyStore::new();
        store.set("db", json!({ "host": "localhost", "pool": { "size": 4 } }));

        store.seal("db");

        assert!(!store.set("db.user", json!("admin")));
        assert!(!store.has("db.user"));
        assert!(!store.set("db.extra.deep", json!(1)));
        assert!(!store.has("db.extra"));
        assert_eq!(
            store.get("db"),
            Some(&json!({ "host": "localhost", "pool": { "size": 4 } }))
        );
    }

    #[test]
    fn sealed_object_keys_stay_writable() {
        let mut store = PropertyStore::new();
        store.set("db", json!({ "host": "localhost", "pool": { "size": 4 } }));

        store.seal("db");

        assert!(store.set("db.host", json!("remote")));
        assert!(store.set("db.pool.max", json!(8)));
        assert_eq!(
            store.get("db"),
            Some(&json!({ "host": "remote", "pool": { "size": 4, "max": 8 } }))
        );
        assert_index_matches_tree(&store);
    }

    #[test]
    fn seal_is_not_inherited() {
        let mut store = PropertyStore::new();
        store.set("a.b.c", json!(1));

        store.seal("a.b");

        assert!(store.set("a.b.c", json!(2)));
        assert!(!store.is_sealed("a.b.c"));
        assert!(!store.is_sealed("a"));
        assert!(store.set("a", json!({ "fresh": true })));
        assert!(!store.has("a.b"));
    }

    #[test]
    fn seal_survives_ancestor_replacement() {
        let mut store = PropertyStore::new();
        store.set("a.b", json!({ "c": 1 }));
        store.seal("a.b");

        store.set("a", json!({}));

        assert!(!store.set("a.b", json!(5)));
        assert!(!store.set("a.b.c", json!(5)));
        assert_eq!(store.get("a"), Some(&json!({})));
    }

    #[test]
    fn sealed_leaf_blocks_descendant_writes() {
        let mut store = PropertyStore::new();
        store.set("a", json!(1));
        store.seal("a");

        assert!(!store.set("a.b", json!(2)));
        assert_eq!(store.get("a"), Some(&json!(1)));
        assert!(!store.has("a.b"));
    }
}

mod queries {
    use super::*;

    #[test]
    fn equals_compares_values() {
        let mut store = PropertyStore::new();
        store.set("foo", json!("bar"));

        assert!(store.equals("foo", &json!("bar")));
        assert!(!store.equals("foo", &json!("notbar")));
        assert!(!store.equals("missing", &Value::Null));

        store.set("foo", json!("baz"));
        assert!(!store.equals("foo", &json!("bar")));
    }

    #[test]
    fn pick_and_omit_are_shallow() {
        let mut store = PropertyStore::new();
        store.set("x", json!({ "a": 1, "b": 2, "c": { "d": 3 } }));

        assert_eq!(Value::Object(store.pick("x", &["a"])), json!({ "a": 1 }));
        assert_eq!(
            Value::Object(store.omit("x", &["a"])),
            json!({ "b": 2, "c": { "d": 3 } })
        );
        assert_eq!(
            Value::Object(store.pick("x", &["c", "missing"])),
            json!({ "c": { "d": 3 } })
        );
    }

    #[test]
    fn pick_and_omit_on_non_objects_are_empty() {
        let mut store = PropertyStore::new();
        store.set("leaf", json!(1));
        store.set("list", json!([1, 2]));

        assert!(store.pick("leaf", &["a"]).is_empty());
        assert!(store.omit("list", &[]).is_empty());
        assert!(store.pick("missing", &["a"]).is_empty());
    }

    #[test]
    fn omit_preserves_insertion_order() {
        let mut store = PropertyStore::new();
        store.set("x", json!({ "z": 1, "y": 2, "x": 3 }));

        let keys: Vec<String> = store.omit("x", &["y"]).keys().cloned().collect();

        assert_eq!(keys, vec!["z", "x"]);
    }

    #[test]
    fn any_returns_first_present() {
        let mut store = PropertyStore::new();
        store.set("second", json!(2));
        store.set("third", json!(3));

        assert_eq!(store.any(&["first", "second", "third"]), Some(&json!(2)));
        assert_eq!(store.any(&["first"]), None);
        assert_eq!(store.any(&[]), None);
    }
}

mod instances {
    use super::*;

    #[test]
    fn instance_shares_plugins_not_data() {
        let mut source = PropertyStore::with_defaults();
        source.set("foo", json!("bar"));
        source.seal("foo");
        source.set_options(OptionsUpdate::separator(":")).unwrap();

        let derived = source.instance();

        assert!(derived.is_empty());
        assert!(!derived.is_sealed("foo"));
        assert_eq!(derived.options().separator, ".");
        assert_eq!(derived.plugins().names(), source.plugins().names());
    }

    #[test]
    fn new_store_has_no_plugins() {
        let store = PropertyStore::new();

        assert!(store.plugins().names().is_empty());
        assert_eq!(
            PropertyStore::with_defaults().plugins().names(),
            vec!["env", "json", "literal", "toml"]
        );
    }
}

mod internals {
    use super::*;

    #[test]
    fn plain_object_detection() {
        assert!(is_plain_object(&json!({})));
        assert!(is_plain_object(&json!({ "a": 1 })));
        assert!(!is_plain_object(&Value::Null));
        assert!(!is_plain_object(&json!(false)));
        assert!(!is_plain_object(&json!([])));
        assert!(!is_plain_object(&json!("{}")));
        assert!(!is_plain_object(&json!(0)));
    }

    #[test]
    fn index_invalidates_replaced_subtree_only() {
        let previous = json!({ "b": { "c": 1 } });
        let mut index = ReferenceIndex::default();
        index.materialize("a", Location::of(&["a"], "."), &previous, ".", true);
        index.materialize("ab", Location::of(&["ab"], "."), &json!(2), ".", true);

        assert_eq!(index.len(), 4);

        let removed = index.invalidate("a", Some(&previous), ".");

        assert_eq!(removed, 3);
        assert!(index.contains("ab"));
    }

    #[test]
    fn index_holds_locations_not_values() {
        let mut index = ReferenceIndex::default();
        index.materialize("a", Location::of(&["a"], "."), &json!({ "b": { "c": 1 } }), ".", true);

        let location = index.location("a.b.c").unwrap();
        let segments: Vec<&str> = location.segments("a.b.c").collect();

        assert_eq!(segments, vec!["a", "b", "c"]);
        assert!(!index.contains("a.b.c.d"));
    }

    #[test]
    fn locations_slice_the_indexed_path() {
        let location = Location::of(&["a", "", "b.c"], "::");
        let segments: Vec<&str> = location.segments("a::::b.c").collect();

        assert_eq!(segments, vec!["a", "", "b.c"]);
        assert_eq!(Location::of(&["solo"], "."), Location::of(&["other"], "."));
    }

    #[test]
    fn frozen_tree_rejects_new_keys() {
        let mut tree = PropertyTree::default();
        tree.insert(&[], "a", json!({ "b": 1 })).unwrap();
        tree.freeze(&["a"]);

        assert!(tree.insert(&["a"], "c", json!(2)).is_err());
        assert!(tree.insert(&["a"], "b", json!(2)).is_ok());
        assert!(tree.is_frozen(&["a"]));

        tree.insert(&[], "a", json!({})).unwrap();

        assert!(!tree.is_frozen(&["a"]));
        assert!(tree.insert(&["a"], "c", json!(2)).is_ok());
    }

    #[test]
    fn tree_insert_needs_object_parent() {
        let mut tree = PropertyTree::default();
        tree.insert(&[], "leaf", json!(1)).unwrap();

        assert!(tree.insert(&["leaf"], "x", json!(1)).is_err());
        assert!(tree.insert(&["missing"], "x", json!(1)).is_err());
    }
}
