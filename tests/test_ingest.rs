mod common;

use common::{article, setup};
use newsrag::config::COLLECTION_NAME;
use newsrag::domain::error::DomainError;
use newsrag::infrastructure::embeddings::noop::NoopProvider;
use newsrag::NewsRag;
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_one_record_per_index() {
    let app = setup();
    let items = vec![
        article(vec![0.1, 0.2], "first body", "First", "http://one"),
        article(vec![0.3, 0.4], "second body", "Second", "http://two"),
        article(vec![0.5, 0.6], "third body", "Third", "http://three"),
    ];
    assert_eq!(app.ingest(items).unwrap(), 3);

    let stats = app.stats().unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.dimension, Some(2));

    let second = app.record("1").unwrap().unwrap();
    assert_eq!(second.content, "second body");
    assert_eq!(second.embedding, vec![0.3, 0.4]);
    assert_eq!(second.metadata.title.as_deref(), Some("Second"));
    assert_eq!(second.metadata.link.as_deref(), Some("http://two"));
    assert!(app.record("3").unwrap().is_none());
}

#[test]
fn test_reingest_is_idempotent() {
    let app = setup();
    let batch = || {
        vec![
            article(vec![1.0, 0.0], "a", "A", "http://a"),
            article(vec![0.0, 1.0], "b", "B", "http://b"),
        ]
    };
    app.ingest(batch()).unwrap();
    app.ingest(batch()).unwrap();

    assert_eq!(app.stats().unwrap().count, 2);
    assert_eq!(app.record("0").unwrap().unwrap().content, "a");
}

#[test]
fn test_reingest_overwrites_by_position() {
    let app = setup();
    app.ingest(vec![article(vec![1.0], "old", "Old", "http://old")]).unwrap();
    app.ingest(vec![article(vec![2.0], "new", "New", "http://new")]).unwrap();

    let record = app.record("0").unwrap().unwrap();
    assert_eq!(record.content, "new");
    assert_eq!(record.embedding, vec![2.0]);
    assert_eq!(app.stats().unwrap().count, 1);
}

#[test]
fn test_stale_ids_are_kept() {
    let app = setup();
    app.ingest(vec![
        article(vec![1.0], "a", "A", "http://a"),
        article(vec![1.0], "b", "B", "http://b"),
    ])
    .unwrap();
    app.ingest(vec![article(vec![1.0], "c", "C", "http://c")]).unwrap();

    assert_eq!(app.stats().unwrap().count, 2);
    assert_eq!(app.record("1").unwrap().unwrap().content, "b");
}

#[test]
fn test_explicit_ids_are_used() {
    let app = setup();
    let mut item = article(vec![1.0, 1.0], "body", "T", "http://t");
    item.id = Some("story-9".into());
    app.ingest(vec![item]).unwrap();

    assert!(app.record("0").unwrap().is_none());
    assert_eq!(app.record("story-9").unwrap().unwrap().content, "body");
}

#[test]
fn test_duplicate_ids_fail_batch() {
    let app = setup();
    let mut a = article(vec![1.0], "a", "A", "http://a");
    let mut b = article(vec![1.0], "b", "B", "http://b");
    a.id = Some("same".into());
    b.id = Some("same".into());

    let err = app.ingest(vec![a, b]).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(app.stats().unwrap().count, 0);
}

#[test]
fn test_dimension_mismatch_within_batch_writes_nothing() {
    let app = setup();
    let err = app
        .ingest(vec![
            article(vec![1.0, 2.0], "ok", "A", "http://a"),
            article(vec![1.0, 2.0, 3.0], "bad", "B", "http://b"),
        ])
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let stats = app.stats().unwrap();
    assert_eq!(stats.count, 0);
    assert_eq!(stats.dimension, None);
}

#[test]
fn test_dimension_fixed_across_runs() {
    let app = setup();
    app.ingest(vec![article(vec![1.0, 2.0], "a", "A", "http://a")]).unwrap();
    let err = app
        .ingest(vec![article(vec![1.0, 2.0, 3.0], "b", "B", "http://b")])
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(app.record("0").unwrap().unwrap().content, "a");
}

#[test]
fn test_empty_batch() {
    let app = setup();
    assert_eq!(app.ingest(vec![]).unwrap(), 0);
    assert_eq!(app.stats().unwrap().count, 0);
}

#[test]
fn test_ingest_file() {
    let app = setup();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"embedding": [0.1, 0.2], "content": "hello world", "title": "A", "link": "http://a"}},
            {{"embedding": [0.2, 0.1], "content": "goodbye", "title": "B", "link": "http://b"}}
        ]"#
    )
    .unwrap();

    assert_eq!(app.ingest_file(file.path()).unwrap(), 2);
    assert_eq!(app.record("1").unwrap().unwrap().content, "goodbye");
}

#[test]
fn test_missing_embedding_fails_whole_file() {
    let app = setup();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"embedding": [0.1, 0.2], "content": "first", "title": "A", "link": "http://a"}},
            {{"content": "second", "title": "B", "link": "http://b"}},
            {{"embedding": [0.3, 0.4], "content": "third", "title": "C", "link": "http://c"}}
        ]"#
    )
    .unwrap();

    let err = app.ingest_file(file.path()).unwrap_err();
    match err {
        DomainError::Parse(msg) => assert!(msg.contains("embedding")),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert_eq!(app.stats().unwrap().count, 0);
}

#[test]
fn test_malformed_file() {
    let app = setup();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    assert!(matches!(app.ingest_file(file.path()), Err(DomainError::Parse(_))));
}

#[test]
fn test_missing_file() {
    let app = setup();
    let dir = tempfile::tempdir().unwrap();
    let err = app.ingest_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, DomainError::Io(_)));
}

#[test]
fn test_collection_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = dir.path().join("chroma_db");
    let db_dir = db_dir.to_str().unwrap();

    {
        let app = NewsRag::with_providers(db_dir, COLLECTION_NAME, Arc::new(NoopProvider)).unwrap();
        app.ingest(vec![article(vec![0.5, 0.5], "kept", "K", "http://k")]).unwrap();
    }

    let reopened = NewsRag::with_providers(db_dir, COLLECTION_NAME, Arc::new(NoopProvider)).unwrap();
    let stats = reopened.stats().unwrap();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.dimension, Some(2));
    assert_eq!(reopened.record("0").unwrap().unwrap().content, "kept");
}
