#![allow(clippy::unwrap_used, clippy::expect_used)]

// Fragment store, merge and merge-on-write

mod common;

use common::{article_json, schemas, setup_db};
use lax_core::errors::ExErrorKind;
use lax_core::model::fragment::DEFAULT_POSITION;
use lax_engine::commands::fragments::{
    add_fragment, get_fragment, merge, merge_and_store, merge_version, remove_fragment,
    validate, FragmentTarget,
};
use lax_engine::commands::queries::article_version;
use lax_engine::{ingest, IngestOptions, MergeOnWrite, NoopVersionHook};
use lax_core::model::Status;
use serde_json::json;

#[test]
fn test_add_get_remove_round() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(5001, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    let target = FragmentTarget::Article(5001);

    let added = add_fragment(&mut conn, target, "xml->json", json!({"title": "T"}), DEFAULT_POSITION, false)
        .unwrap();
    assert_eq!(added.version, None);
    assert_eq!(get_fragment(&conn, target, "xml->json").unwrap(), json!({"title": "T"}));

    remove_fragment(&mut conn, target, "xml->json").unwrap();
    let err = get_fragment(&conn, target, "xml->json").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);

    let err = remove_fragment(&mut conn, target, "xml->json").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_existing_fragment_only_overwritten_with_update() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(5002, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    let target = FragmentTarget::Version(5002, 1);

    add_fragment(&mut conn, target, "extra", json!({"a": 1}), 1, false).unwrap();

    let kept = add_fragment(&mut conn, target, "extra", json!({"a": 2}), 1, false).unwrap();
    assert_eq!(kept.fragment, json!({"a": 1}));

    let replaced = add_fragment(&mut conn, target, "extra", json!({"a": 3}), 2, true).unwrap();
    assert_eq!(replaced.fragment, json!({"a": 3}));
    assert_eq!(replaced.position, 2);
    assert_eq!(replaced.id, kept.id);
}

#[test]
fn test_non_object_fragment_is_invalid() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(5003, 1), IngestOptions::default(), &NoopVersionHook).unwrap();

    let err = add_fragment(&mut conn, FragmentTarget::Article(5003), "bad", json!([1, 2]), 1, false)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_fragment_for_unknown_article_is_not_found() {
    let (_tmp, mut conn) = setup_db();
    let err = add_fragment(&mut conn, FragmentTarget::Article(404), "x", json!({}), 1, false)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_merge_orders_by_position_and_merges_recursively() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(5004, 1), IngestOptions::default(), &NoopVersionHook).unwrap();

    add_fragment(&mut conn, FragmentTarget::Version(5004, 1), "third", json!({"title": "three", "pdf": {"size": 3}}), 3, false)
        .unwrap();
    add_fragment(&mut conn, FragmentTarget::Article(5004), "first", json!({"title": "one", "pdf": {"uri": "a.pdf"}, "subjects": ["x", "y"]}), 1, false)
        .unwrap();
    add_fragment(&mut conn, FragmentTarget::Version(5004, 1), "second", json!({"title": "two", "subjects": ["z"]}), 2, false)
        .unwrap();
    // another version's fragment never applies
    add_fragment(&mut conn, FragmentTarget::Version(5004, 2), "other", json!({"title": "nope"}), 9, false)
        .unwrap();

    let av = article_version(&conn, 5004, 1, false).unwrap();
    let merged = merge(&conn, &av).unwrap();

    assert_eq!(
        merged,
        json!({"title": "three", "pdf": {"uri": "a.pdf", "size": 3}, "subjects": ["z"]})
    );
    // stored fragments are untouched
    assert_eq!(
        get_fragment(&conn, FragmentTarget::Article(5004), "first").unwrap()["subjects"],
        json!(["x", "y"])
    );
}

#[test]
fn test_merge_without_fragments_is_empty_object() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(5005, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    let av = article_version(&conn, 5005, 1, false).unwrap();

    assert_eq!(merge(&conn, &av).unwrap(), json!({}));
}

#[test]
fn test_validate_uses_schema_for_status() {
    let schemas = schemas();
    let doc = json!({"title": "T"});

    assert_eq!(validate(&schemas, doc.clone(), Status::Poa), Some(doc.clone()));
    assert_eq!(validate(&schemas, doc, Status::Vor), None);
}

#[test]
fn test_merge_and_store_stores_snippet_when_valid() {
    let (_tmp, mut conn) = setup_db();
    let schemas = schemas();
    ingest(&mut conn, &article_json(5006, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    add_fragment(&mut conn, FragmentTarget::Article(5006), "xml->json", json!({"title": "T", "body": ["long"], "volume": 4}), 1, false)
        .unwrap();

    let av = article_version(&conn, 5006, 1, false).unwrap();
    let stored = merge_and_store(&conn, &av, &schemas).unwrap();
    assert!(stored.is_some());

    let av = article_version(&conn, 5006, 1, false).unwrap();
    assert_eq!(av.article_json_v1, Some(json!({"title": "T", "body": ["long"], "volume": 4})));
    assert_eq!(av.article_json_v1_snippet, Some(json!({"title": "T", "volume": 4})));
}

#[test]
fn test_merge_and_store_leaves_version_untouched_when_invalid() {
    let (_tmp, mut conn) = setup_db();
    let schemas = schemas();
    ingest(&mut conn, &article_json(5007, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    add_fragment(&mut conn, FragmentTarget::Article(5007), "xml->json", json!({"title": 12}), 1, false)
        .unwrap();

    let before = article_version(&conn, 5007, 1, false).unwrap();
    assert_eq!(merge_and_store(&conn, &before, &schemas).unwrap(), None);

    let after = article_version(&conn, 5007, 1, false).unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_merge_on_write_hook_stores_merge_during_ingest() {
    let (_tmp, mut conn) = setup_db();
    let schemas = schemas();
    ingest(&mut conn, &article_json(5008, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    add_fragment(&mut conn, FragmentTarget::Article(5008), "xml->json", json!({"title": "Merged"}), 1, false)
        .unwrap();

    let result = ingest(
        &mut conn,
        &article_json(5008, 1),
        IngestOptions::default(),
        &MergeOnWrite::new(&schemas),
    )
    .unwrap();

    assert_eq!(result.article_version.article_json_v1, Some(json!({"title": "Merged"})));
}

#[test]
fn test_merge_version_resolves_by_msid() {
    let (_tmp, mut conn) = setup_db();
    let schemas = schemas();
    ingest(&mut conn, &article_json(5009, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    add_fragment(&mut conn, FragmentTarget::Version(5009, 1), "x", json!({"title": "V"}), 1, false)
        .unwrap();

    assert_eq!(
        merge_version(&mut conn, 5009, 1, &schemas).unwrap(),
        Some(json!({"title": "V"}))
    );
    let err = merge_version(&mut conn, 5009, 7, &schemas).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
