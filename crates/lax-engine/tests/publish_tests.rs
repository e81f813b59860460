#![allow(clippy::unwrap_used, clippy::expect_used)]

// Publish engine: guard, force, timestamp normalization

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{article_json, setup_db};
use lax_core::datetime::Timestamp;
use lax_core::errors::{ExErrorKind, StateRule};
use lax_engine::{ingest, publish, IngestOptions, NoopVersionHook, PublishOptions};

#[test]
fn test_scenario_ingest_then_publish_elife_1968() {
    let (_tmp, mut conn) = setup_db();

    // GIVEN eLife 1968 v1 ingested
    let ingested = ingest(&mut conn, &article_json(1968, 1), IngestOptions::default(), &NoopVersionHook)
        .unwrap();
    assert_eq!(ingested.article_version.datetime_published, None);

    // WHEN it is published with no explicit time
    let before = Utc::now();
    let published = publish(&mut conn, 1968, 1, None, PublishOptions::default()).unwrap();

    // THEN it carries a UTC timestamp close to the call
    let when = published.datetime_published.expect("published");
    assert!(when >= before - Duration::seconds(1));
    assert!(when <= Utc::now() + Duration::seconds(1));
    assert_eq!(published.id, ingested.article_version.id);
}

#[test]
fn test_publish_missing_version_is_state_violation() {
    let (_tmp, mut conn) = setup_db();

    let err = publish(&mut conn, 4040, 1, None, PublishOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StateViolation);
    assert_eq!(err.rule(), Some(StateRule::VersionNotFound));

    ingest(&mut conn, &article_json(4040, 1), IngestOptions::default(), &NoopVersionHook).unwrap();
    let err = publish(&mut conn, 4040, 2, None, PublishOptions::default()).unwrap_err();
    assert_eq!(err.rule(), Some(StateRule::VersionNotFound));
}

#[test]
fn test_republish_guard_and_force() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(2001, 1), IngestOptions::default(), &NoopVersionHook).unwrap();

    let first = Utc.with_ymd_and_hms(2016, 4, 13, 1, 0, 0).unwrap();
    publish(&mut conn, 2001, 1, Some(first.into()), PublishOptions::default()).unwrap();

    let err = publish(&mut conn, 2001, 1, None, PublishOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StateViolation);
    assert_eq!(err.rule(), Some(StateRule::AlreadyPublished));

    let second = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
    let forced = publish(
        &mut conn,
        2001,
        1,
        Some(second.into()),
        PublishOptions {
            force: true,
            dry_run: false,
        },
    )
    .unwrap();
    assert_eq!(forced.datetime_published, Some(second));
}

#[test]
fn test_publish_normalizes_given_timestamp() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(2002, 1), IngestOptions::default(), &NoopVersionHook).unwrap();

    let published = publish(
        &mut conn,
        2002,
        1,
        Some(Timestamp::from("2016-04-13T01:00:00+01:00")),
        PublishOptions::default(),
    )
    .unwrap();

    assert_eq!(
        published.datetime_published,
        Some(Utc.with_ymd_and_hms(2016, 4, 13, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_publish_rejects_unparseable_timestamp() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(2003, 1), IngestOptions::default(), &NoopVersionHook).unwrap();

    let err = publish(
        &mut conn,
        2003,
        1,
        Some(Timestamp::from("last tuesday")),
        PublishOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_dry_run_publish_leaves_version_unpublished() {
    let (_tmp, mut conn) = setup_db();
    ingest(&mut conn, &article_json(2004, 1), IngestOptions::default(), &NoopVersionHook).unwrap();

    let preview = publish(
        &mut conn,
        2004,
        1,
        None,
        PublishOptions {
            force: false,
            dry_run: true,
        },
    )
    .unwrap();
    assert!(preview.is_published());

    let stored = lax_engine::commands::queries::article_version(&conn, 2004, 1, false).unwrap();
    assert!(!stored.is_published());
}
