use futures::StreamExt;
use itlab_sync::db::migrate::{applied_versions, latest_version};
use itlab_sync::errors::AppError;
use itlab_sync::models::events::{Event, EventRole, EventType};
use itlab_sync::store::entity::Table;
use itlab_sync::store::{CacheStore, Criteria, load_all};
use std::time::Duration;
use tokio::time::timeout;

mod common;
use common::temp_store;

fn event_type(id: &str, title: &str) -> EventType {
    EventType {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
    }
}

fn event(id: &str, type_id: &str) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {id}"),
        address: String::new(),
        type_id: type_id.to_string(),
        begin_time: "2026-03-01T10:00:00.000Z".to_string(),
        end_time: "2026-03-01T18:00:00.000Z".to_string(),
    }
}

fn role(id: &str) -> EventRole {
    EventRole {
        id: id.to_string(),
        title: "Participant".to_string(),
        description: None,
    }
}

#[test]
fn test_upsert_is_idempotent_and_overwrites() {
    let (_dir, store) = temp_store();

    store.upsert(&[event_type("t1", "Hackathon")]).unwrap();
    store.upsert(&[event_type("t1", "Hackathon")]).unwrap();
    assert_eq!(store.count(Table::EventTypes).unwrap(), 1);

    store.upsert(&[event_type("t1", "Meetup")]).unwrap();
    let stored: Option<EventType> = store.get("t1".to_string()).unwrap();
    assert_eq!(stored.unwrap().title, "Meetup");
    assert_eq!(store.count(Table::EventTypes).unwrap(), 1);
}

#[test]
fn test_batch_with_missing_parent_rolls_back_entirely() {
    let (_dir, store) = temp_store();

    let err = store
        .batch(|b| {
            b.upsert(&[event_type("t1", "Hackathon")])?;
            b.upsert(&[event("e1", "missing-type")])
        })
        .unwrap_err();

    assert!(err.is_constraint_violation(), "unexpected error: {err}");
    assert_eq!(store.count(Table::EventTypes).unwrap(), 0);
    assert_eq!(store.count(Table::Events).unwrap(), 0);
}

#[test]
fn test_parents_first_batch_succeeds() {
    let (_dir, store) = temp_store();

    store
        .batch(|b| {
            b.upsert(&[event_type("t1", "Hackathon")])?;
            b.upsert(&[event("e1", "t1"), event("e2", "t1")])
        })
        .unwrap();

    assert_eq!(store.count(Table::Events).unwrap(), 2);
}

#[test]
fn test_deleting_parent_with_children_is_rejected() {
    let (_dir, store) = temp_store();
    store.upsert(&[event_type("t1", "Hackathon")]).unwrap();
    store.upsert(&[event("e1", "t1")]).unwrap();

    let err = store
        .delete::<EventType>(Criteria::ids(["t1".to_string()]))
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation { .. }));
    assert_eq!(store.count(Table::EventTypes).unwrap(), 1);

    // Children first, then the parent.
    store.delete::<Event>(Criteria::eq("type_id", "t1".to_string())).unwrap();
    assert_eq!(store.delete::<EventType>(Criteria::ids(["t1".to_string()])).unwrap(), 1);
}

#[test]
fn test_delete_rejects_unknown_column() {
    let (_dir, store) = temp_store();
    let err = store
        .delete::<Event>(Criteria::eq("no_such_column", "x".to_string()))
        .unwrap_err();
    assert!(matches!(err, AppError::Other(_)));
}

#[test]
fn test_reopening_applies_no_migration_twice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite");
    let path = path.to_string_lossy();

    let first = CacheStore::open(&path).unwrap();
    let applied = first.query(applied_versions).unwrap();
    assert_eq!(applied.last().map(String::as_str), Some(latest_version()));
    drop(first);

    let second = CacheStore::open(&path).unwrap();
    assert_eq!(second.query(applied_versions).unwrap(), applied);
}

#[tokio::test]
async fn test_live_query_emits_on_watched_tables_only() {
    let (_dir, store) = temp_store();
    let mut types = store.observe(&[Table::EventTypes], |conn| load_all::<EventType>(conn));

    let first = types.next().await.unwrap().unwrap();
    assert!(first.is_empty());

    store.upsert(&[role("r1")]).unwrap();
    assert!(
        timeout(Duration::from_millis(100), types.next())
            .await
            .is_err(),
        "a write to event_roles must not wake an event_types query"
    );

    store.upsert(&[event_type("t1", "Hackathon")]).unwrap();
    let second = timeout(Duration::from_secs(2), types.next())
        .await
        .expect("live query did not emit")
        .unwrap()
        .unwrap();
    assert_eq!(second.len(), 1);

    store.upsert(&[event_type("t2", "Meetup")]).unwrap();
    let third = timeout(Duration::from_secs(2), types.next())
        .await
        .expect("live query did not emit")
        .unwrap()
        .unwrap();
    assert_eq!(third.len(), 2);
}

#[tokio::test]
async fn test_resubscribe_starts_from_current_value() {
    let (_dir, store) = temp_store();
    let mut live = store.observe(&[Table::EventTypes], |conn| load_all::<EventType>(conn));
    live.next().await.unwrap().unwrap();

    store.upsert(&[event_type("t1", "Hackathon")]).unwrap();

    let mut again = live.resubscribe();
    let now = timeout(Duration::from_secs(2), again.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(now.len(), 1);
}

#[tokio::test]
async fn test_live_query_as_stream_and_mapped() {
    let (_dir, store) = temp_store();
    let counts = store
        .observe(&[Table::EventTypes], |conn| load_all::<EventType>(conn))
        .map(|v| v.len());

    let writer = store.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        writer.upsert(&[event_type("t1", "Hackathon")]).unwrap();
    });

    let seen: Vec<usize> = timeout(
        Duration::from_secs(2),
        counts.into_stream().take(2).map(|r| r.unwrap()).collect(),
    )
    .await
    .unwrap();
    handle.await.unwrap();

    assert_eq!(seen, vec![0, 1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_live_query_runs_inside_spawned_task() {
    let (_dir, store) = temp_store();
    let mut live = store.observe(&[Table::EventTypes], |conn| load_all::<EventType>(conn));

    let watcher = tokio::spawn(async move {
        let mut sizes = Vec::new();
        while let Some(Ok(types)) = live.next().await {
            sizes.push(types.len());
            if types.len() == 2 {
                break;
            }
        }
        sizes
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    store.upsert(&[event_type("t1", "Hackathon")]).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.upsert(&[event_type("t2", "Meetup")]).unwrap();

    let sizes = timeout(Duration::from_secs(2), watcher).await.unwrap().unwrap();
    assert_eq!(sizes, vec![0, 1, 2]);
}
