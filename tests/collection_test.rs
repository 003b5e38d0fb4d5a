use linked_sync::model::{Feed, FeedItem, LinkedDocument};
use linked_sync::runtime::try_setup_tracing;
use linked_sync::transport::MockTransport;
use linked_sync::{ItemSelector, Link, Status, SyncEngine, SyncError, SyncOptions};
use serde_json::json;

const QUESTIONS: &str = "https://api.example.com/organisation/a65/question";
const CREATE_FORM: &str = "https://api.example.com/question/form/create";
const A: &str = "https://api.example.com/question/a";
const B: &str = "https://api.example.com/question/b";
const C: &str = "https://api.example.com/question/c";

fn feed(items: &[(&str, &str)]) -> Feed {
    Feed::new(items.iter().map(|(id, title)| FeedItem::new(*id, *title)).collect()).with_links(vec![
        Link::new("self", QUESTIONS),
        Link::new("create-form", CREATE_FORM),
    ])
}

fn question(uri: &str, name: &str) -> LinkedDocument {
    LinkedDocument::new(vec![Link::new("self", uri)]).with_attribute("name", name)
}

fn engine() -> (MockTransport, SyncEngine) {
    try_setup_tracing();
    let mock = MockTransport::new();
    let engine = SyncEngine::new(mock.clone());
    (mock, engine)
}

/// `{A (hydrated), B (stale)}` merged with feed `{A, C}` keeps A as-is, adds a sparse C and drops B.
#[tokio::test]
async fn test_merge_preserves_hydrated_members() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a"), (B, "b")]));
    mock.expect_load(A).return_ok(question(A, "a hydrated"));
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a"), (C, "c")]));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine.load(&questions, &SyncOptions::default()).await.expect("feed");
    let items = questions.items();
    let a = items[0].clone();
    let b = items[1].clone();
    engine.load(&a, &SyncOptions::default()).await.expect("hydrate a");
    engine.store().transition(&b, Status::Stale);

    engine
        .load(&questions, &SyncOptions::default().force_load())
        .await
        .expect("reload feed");

    let items = questions.items();
    assert_eq!(items.len(), 2);
    assert!(items[0].ptr_eq(&a));
    assert_eq!(engine.status(&a), Some(Status::Hydrated));
    assert_eq!(a.attribute("name"), Some(json!("a hydrated")));
    assert_eq!(items[1].self_uri().as_deref(), Some(C));
    assert_eq!(engine.status(&items[1]), Some(Status::LocationOnly));
    assert_eq!(items[1].attribute("name"), Some(json!("c")));
    assert!(!items.iter().any(|item| item.ptr_eq(&b)));
    mock.verify();
}

#[tokio::test]
async fn test_feed_links_replace_collection_links() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[]));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine.load(&questions, &SyncOptions::default()).await.expect("feed");

    assert_eq!(questions.uri("create-form").as_deref(), Some(CREATE_FORM));
    assert!(questions.items().is_empty());
    assert_eq!(engine.status(&questions), Some(Status::Hydrated));
}

#[tokio::test]
async fn test_include_items_runs_when_collection_is_fresh() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a"), (B, "b")]));
    mock.expect_load(A).return_ok(question(A, "a"));
    mock.expect_load(B).return_ok(question(B, "b"));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine.load(&questions, &SyncOptions::default()).await.expect("feed");
    assert_eq!(mock.call_count(), 1);

    engine
        .load(&questions, &SyncOptions::default().include_items())
        .await
        .expect("items");

    assert_eq!(mock.call_count(), 3);
    assert!(questions
        .items()
        .iter()
        .all(|item| engine.status(item) == Some(Status::Hydrated)));
    mock.verify();
}

#[tokio::test]
async fn test_force_load_feed_only_keeps_items() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a")]));
    mock.expect_load(A).return_ok(question(A, "a"));
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a")]));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine
        .load(&questions, &SyncOptions::default().include_items())
        .await
        .expect("first");
    engine
        .load(
            &questions,
            &SyncOptions::default().force_load_feed_only().include_items(),
        )
        .await
        .expect("feed only");

    assert_eq!(mock.call_count(), 3);
    mock.verify();
}

#[tokio::test]
async fn test_force_load_reloads_items_too() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a")]));
    mock.expect_load(A).return_ok(question(A, "a"));
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a")]));
    mock.expect_load(A).return_ok(question(A, "a2"));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    let options = SyncOptions::default().include_items();
    engine.load(&questions, &options).await.expect("first");
    engine
        .load(&questions, &options.clone().force_load())
        .await
        .expect("forced");

    assert_eq!(questions.items()[0].attribute("name"), Some(json!("a2")));
    mock.verify();
}

#[tokio::test]
async fn test_remove_collection_item_marks_stale() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a"), (B, "b")]));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine.load(&questions, &SyncOptions::default()).await.expect("feed");
    let a = questions.items()[0].clone();

    let removed = engine
        .remove_collection_item(&questions, &a)
        .expect("a is a member");
    assert!(removed.ptr_eq(&a));
    assert_eq!(engine.status(&a), Some(Status::Stale));
    assert_eq!(questions.items().len(), 1);

    let stranger = engine.factory().from_uri(C);
    assert!(engine.remove_collection_item(&questions, &stranger).is_none());

    // A stale item is fetched again on its next load.
    mock.expect_load(A).return_ok(question(A, "a again"));
    engine.load(&a, &SyncOptions::default()).await.expect("reload a");

    assert_eq!(mock.call_count(), 2);
    assert_eq!(engine.status(&a), Some(Status::Hydrated));
    assert_eq!(a.attribute("name"), Some(json!("a again")));
    mock.verify();
}

#[tokio::test]
async fn test_load_item_by_uri_and_title() {
    let (mock, engine) = engine();
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "first"), (B, "second")]));
    mock.expect_load(B).return_ok(question(B, "second"));
    mock.expect_load(A).return_ok(question(A, "first"));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    let b = engine
        .load_item(&questions, &ItemSelector::Uri(B.to_string()), &SyncOptions::default())
        .await
        .expect("load item")
        .expect("found");
    assert_eq!(engine.status(&b), Some(Status::Hydrated));

    let a = engine
        .load_item(&questions, &ItemSelector::Title("first".to_string()), &SyncOptions::default())
        .await
        .expect("load item")
        .expect("found");
    assert_eq!(a.self_uri().as_deref(), Some(A));

    let missing = engine
        .load_item(&questions, &ItemSelector::Title("third".to_string()), &SyncOptions::default())
        .await
        .expect("load item");
    assert!(missing.is_none());
    mock.verify();
}

#[tokio::test]
async fn test_load_named_child_collection() {
    let (mock, engine) = engine();
    let organisation = "https://api.example.com/organisation/a65";
    mock.expect_load(organisation).return_ok(
        LinkedDocument::new(vec![
            Link::new("self", organisation),
            Link::new("questions", QUESTIONS),
        ])
        .with_attribute("name", "Org"),
    );
    mock.expect_load(QUESTIONS).return_ok(feed(&[(A, "a")]));

    let org = engine.factory().from_uri(organisation);
    engine.load(&org, &SyncOptions::default()).await.expect("org");

    let questions = engine
        .load_named(&org, "questions", &SyncOptions::default())
        .await
        .expect("questions");
    assert!(questions.is_collection());
    assert!(org.child("questions").is_some_and(|c| c.ptr_eq(&questions)));

    let state = engine.state(&org).expect("tracked");
    assert!(state.collection.contains("questions"));
    assert!(!state.singleton.contains("questions"));

    let again = engine
        .load_named(&org, "questions", &SyncOptions::default())
        .await
        .expect("cached");
    assert!(again.ptr_eq(&questions));
    assert_eq!(mock.call_count(), 2);

    let err = engine
        .load_named(&org, "edit-form", &SyncOptions::default())
        .await
        .expect_err("no such relation");
    assert!(matches!(err, SyncError::MissingLink { .. }));
    mock.verify();
}

/// Refreshing a collection leaves state records for exactly the live resources.
#[tokio::test]
async fn test_refresh_tracks_only_live_members() {
    let (mock, engine) = engine();
    let members: Vec<String> = (0..20).map(|i| format!("{QUESTIONS}/{i}")).collect();
    let listing: Vec<(&str, &str)> = members.iter().map(|uri| (uri.as_str(), "q")).collect();
    for _ in 0..5 {
        mock.expect_load(QUESTIONS).return_ok(feed(&listing));
    }
    mock.expect_load(QUESTIONS).return_ok(feed(&listing[..5]));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine.load(&questions, &SyncOptions::default()).await.expect("first");
    let first = questions.items();

    for _ in 0..4 {
        engine
            .load(&questions, &SyncOptions::default().force_load())
            .await
            .expect("refresh");
    }
    assert_eq!(engine.store().len(), 21);
    assert!(questions.items().iter().zip(&first).all(|(now, before)| now.ptr_eq(before)));
    drop(first);

    engine
        .load(&questions, &SyncOptions::default().force_load())
        .await
        .expect("shrink");

    assert_eq!(questions.items().len(), 5);
    assert_eq!(engine.store().len(), 6);
    assert_eq!(engine.prune(), 0);
    mock.verify();
}

/// Inline members already present are kept and no replacement state is created.
#[tokio::test]
async fn test_inline_refresh_keeps_members() {
    let (mock, engine) = engine();
    let inline = |names: &[(&str, &str)]| linked_sync::model::CollectionDocument {
        links: vec![Link::new("self", QUESTIONS)],
        items: names.iter().map(|(uri, name)| question(uri, name)).collect(),
        attributes: Default::default(),
    };
    mock.expect_load(QUESTIONS).return_ok(inline(&[(A, "a"), (B, "b")]));
    mock.expect_load(QUESTIONS).return_ok(inline(&[(A, "a"), (B, "b")]));

    let questions = engine.factory().collection_from_uri(QUESTIONS);
    engine.load(&questions, &SyncOptions::default()).await.expect("first");
    let a = questions.items()[0].clone();
    engine
        .load(&questions, &SyncOptions::default().force_load())
        .await
        .expect("refresh");

    assert!(questions.items()[0].ptr_eq(&a));
    assert_eq!(engine.store().len(), 3);
    mock.verify();
}
