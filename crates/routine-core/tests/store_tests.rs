mod common;

use common::create_test_store;
use routine_core::{PlanStore, RoutineError};

#[tokio::test]
async fn test_store_initialization_creates_file() {
    let (temp_dir, store) = create_test_store().await;
    assert!(store.path().exists());
    assert!(store.path().starts_with(temp_dir.path()));
}

#[tokio::test]
async fn test_open_creates_parent_directories() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b").join("routine.db");

    let store = PlanStore::open(Some(&nested))
        .await
        .expect("Failed to open nested store");
    assert!(store.path().exists());
}

#[tokio::test]
async fn test_create_assigns_distinct_ids_and_timestamp() {
    let (_temp_dir, store) = create_test_store().await;

    let before = jiff::Timestamp::now();
    let first = store
        .create("asst_1", "thread_1", "- Goal: Lose fat", "Plan one")
        .await
        .expect("Failed to create record");
    let second = store
        .create("asst_1", "thread_2", "- Goal: Build muscle", "Plan two")
        .await
        .expect("Failed to create record");
    assert_ne!(first, second);

    let record = store
        .get(first)
        .await
        .expect("Failed to get record")
        .expect("Record should exist");
    assert_eq!(record.id, first);
    assert_eq!(record.thread_id, "thread_1");
    assert_eq!(record.plan_text, "Plan one");
    assert_eq!(record.email, None);
    assert!(record.generated_at >= before);
}

#[tokio::test]
async fn test_update_sets_only_email() {
    let (_temp_dir, store) = create_test_store().await;

    let id = store
        .create("asst_1", "thread_1", "- Goal: Lose fat", "Do [Burpees](https://x).")
        .await
        .expect("Failed to create record");
    let created = store.get(id).await.unwrap().unwrap();

    store
        .update(id, "a@b.com")
        .await
        .expect("Failed to update record");

    let updated = store.get(id).await.unwrap().unwrap();
    assert_eq!(updated.email.as_deref(), Some("a@b.com"));
    assert_eq!(updated.assistant_id, created.assistant_id);
    assert_eq!(updated.thread_id, created.thread_id);
    assert_eq!(updated.prompt, created.prompt);
    assert_eq!(updated.plan_text, created.plan_text);
    assert_eq!(updated.generated_at, created.generated_at);
}

#[tokio::test]
async fn test_update_overwrites_previous_email() {
    let (_temp_dir, store) = create_test_store().await;
    let id = store.create("asst_1", "t", "p", "plan").await.unwrap();

    store.update(id, "first@b.com").await.unwrap();
    store.update(id, "second@b.com").await.unwrap();

    let record = store.get(id).await.unwrap().unwrap();
    assert_eq!(record.email.as_deref(), Some("second@b.com"));
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found_and_inserts_nothing() {
    let (_temp_dir, store) = create_test_store().await;

    let err = store.update(42, "a@b.com").await.unwrap_err();
    assert!(matches!(err, RoutineError::NotFound { id: 42 }));

    assert!(store.get(42).await.unwrap().is_none());
    assert!(store.list(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let (_temp_dir, store) = create_test_store().await;

    let mut ids = Vec::new();
    for n in 0..4 {
        ids.push(
            store
                .create("asst_1", &format!("thread_{n}"), "prompt", "plan")
                .await
                .unwrap(),
        );
    }

    let records = store.list(3).await.expect("Failed to list records");
    let listed: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(listed, vec![ids[3], ids[2], ids[1]]);
}

#[tokio::test]
async fn test_concurrent_updates_on_distinct_records() {
    let (_temp_dir, store) = create_test_store().await;

    let mut ids = Vec::new();
    for n in 0..8 {
        ids.push(store.create("asst_1", "t", "p", &format!("plan {n}")).await.unwrap());
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let store = store.clone();
            tokio::spawn(async move { store.update(id, &format!("user{id}@example.com")).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("update failed");
    }

    for id in ids {
        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.email, Some(format!("user{id}@example.com")));
    }
}
