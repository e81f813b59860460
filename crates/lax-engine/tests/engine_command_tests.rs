#![allow(clippy::unwrap_used, clippy::expect_used)]

// Dispatch through apply_engine_command

mod common;

use common::{article_json, schemas, setup_db};
use lax_engine::commands::fragments::FragmentTarget;
use lax_engine::{
    apply_engine_command, EngineCommand, EngineCommandResult, IngestOptions, PublishOptions,
};
use serde_json::json;

#[test]
fn test_command_sequence_ingest_fragment_merge_publish() {
    let (_tmp, mut conn) = setup_db();
    let schemas = schemas();

    let ingested = apply_engine_command(
        EngineCommand::Ingest {
            data: article_json(8001, 1),
            options: IngestOptions::default(),
            merge: false,
        },
        &mut conn,
        &schemas,
    )
    .unwrap();
    assert!(matches!(ingested, EngineCommandResult::Ingested(_)));

    apply_engine_command(
        EngineCommand::FragmentAdd {
            target: FragmentTarget::Article(8001),
            fragment_type: "xml->json".into(),
            fragment: json!({"title": "From fragment"}),
            position: 1,
            update: false,
        },
        &mut conn,
        &schemas,
    )
    .unwrap();

    let fetched = apply_engine_command(
        EngineCommand::FragmentGet {
            target: FragmentTarget::Article(8001),
            fragment_type: "xml->json".into(),
        },
        &mut conn,
        &schemas,
    )
    .unwrap();
    assert_eq!(
        fetched,
        EngineCommandResult::Fragment(json!({"title": "From fragment"}))
    );

    let merged = apply_engine_command(
        EngineCommand::Merge {
            msid: 8001,
            version: 1,
        },
        &mut conn,
        &schemas,
    )
    .unwrap();
    assert_eq!(
        merged,
        EngineCommandResult::Merged(Some(json!({"title": "From fragment"})))
    );

    let published = apply_engine_command(
        EngineCommand::Publish {
            msid: 8001,
            version: 1,
            published_at: None,
            options: PublishOptions::default(),
        },
        &mut conn,
        &schemas,
    )
    .unwrap();
    match published {
        EngineCommandResult::Published(av) => {
            assert!(av.is_published());
            assert_eq!(av.article_json_v1, Some(json!({"title": "From fragment"})));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let removed = apply_engine_command(
        EngineCommand::FragmentRemove {
            target: FragmentTarget::Article(8001),
            fragment_type: "xml->json".into(),
        },
        &mut conn,
        &schemas,
    )
    .unwrap();
    assert_eq!(removed, EngineCommandResult::FragmentRemoved);
}

#[test]
fn test_ingest_publish_with_merge_hook() {
    let (_tmp, mut conn) = setup_db();
    let schemas = schemas();

    let result = apply_engine_command(
        EngineCommand::IngestPublish {
            data: article_json(8002, 1),
            options: IngestOptions::default(),
            merge: true,
        },
        &mut conn,
        &schemas,
    )
    .unwrap();

    match result {
        EngineCommandResult::IngestedPublished(r) => {
            assert!(r.article_version.is_published());
            // no fragments merge to {}, which the POA schema rejects
            assert_eq!(r.article_version.article_json_v1, None);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
