//! Storage layer tests for the WakeWire relay.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use wakewire_core::unix_timestamp;
use wakewire_proto::relay::{DIRECTION_TO_CLIENT, DIRECTION_TO_DEVICE};

use super::db::RelayDatabase;

async fn test_db() -> RelayDatabase {
    RelayDatabase::open_in_memory().await.unwrap()
}

async fn seed_device(db: &RelayDatabase, token: &str) {
    db.create_user("u1", "alice", "api-token-1", "basic", 5)
        .await
        .unwrap();
    db.create_device("u1", "esp1", token, "{}").await.unwrap();
}

// === User tests ===

#[tokio::test]
async fn create_and_resolve_user_by_api_token() {
    let db = test_db().await;
    let user = db
        .create_user("u1", "alice", "api-token-1", "basic", 5)
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.devices_limit, 5);

    let found = db.get_user_by_api_token("api-token-1").await.unwrap();
    assert_eq!(found.unwrap().id, "u1");

    let missing = db.get_user_by_api_token("bogus").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let db = test_db().await;
    db.create_user("u1", "alice", "t1", "basic", 5).await.unwrap();
    assert!(db.create_user("u2", "alice", "t2", "basic", 5).await.is_err());
}

// === Device tests ===

#[tokio::test]
async fn create_and_resolve_device_by_token() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    let device = db.get_device_by_token("dev-token-1").await.unwrap().unwrap();
    assert_eq!(device.device_id, "esp1");
    assert_eq!(device.user_id, "u1");
    assert_eq!(device.poll_count, 0);
    assert!(device.last_seen.is_none());

    assert!(db.get_device_by_token("bogus").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_device_id_per_owner_is_rejected() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    assert!(db.create_device("u1", "esp1", "dev-token-2", "{}").await.is_err());

    // A different owner may reuse the same device_id.
    db.create_user("u2", "bob", "api-token-2", "basic", 5)
        .await
        .unwrap();
    assert!(db.create_device("u2", "esp1", "dev-token-3", "{}").await.is_ok());
}

#[tokio::test]
async fn delete_device_requires_ownership() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    assert!(!db.delete_device_owned("someone-else", "dev-token-1").await.unwrap());
    assert!(db.delete_device_owned("u1", "dev-token-1").await.unwrap());
    assert!(db.get_device_by_token("dev-token-1").await.unwrap().is_none());
}

#[tokio::test]
async fn device_counts() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;
    db.create_device("u1", "esp2", "dev-token-2", "{}").await.unwrap();

    assert_eq!(db.count_devices("u1").await.unwrap(), 2);
    assert_eq!(db.count_devices_total().await.unwrap(), 2);
    assert_eq!(db.count_users().await.unwrap(), 1);
}

// === Queue tests ===

#[tokio::test]
async fn pull_is_fifo_and_destructive() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    for payload in ["aa", "bb", "cc"] {
        db.push_message("dev-token-1", "esp1", "command", payload, DIRECTION_TO_DEVICE)
            .await
            .unwrap();
    }

    let pulled = db.pull_messages("dev-token-1").await.unwrap();
    let payloads: Vec<&str> = pulled.iter().map(|m| m.message_data.as_str()).collect();
    assert_eq!(payloads, ["aa", "bb", "cc"]);

    // Second pull: mailbox is empty.
    let again = db.pull_messages("dev-token-1").await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn pull_ignores_to_client_messages() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    db.push_message("dev-token-1", "esp1", "response", "rr", DIRECTION_TO_CLIENT)
        .await
        .unwrap();
    db.push_message("dev-token-1", "esp1", "command", "cc", DIRECTION_TO_DEVICE)
        .await
        .unwrap();

    let pulled = db.pull_messages("dev-token-1").await.unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].message_data, "cc");

    // The to_client row stays queued until the sweep reclaims it.
    assert_eq!(
        db.count_messages_by_direction(DIRECTION_TO_CLIENT).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn pull_does_not_cross_mailboxes() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;
    db.create_device("u1", "esp2", "dev-token-2", "{}").await.unwrap();

    db.push_message("dev-token-1", "esp1", "command", "for-esp1", DIRECTION_TO_DEVICE)
        .await
        .unwrap();

    assert!(db.pull_messages("dev-token-2").await.unwrap().is_empty());
    assert_eq!(db.pull_messages("dev-token-1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn pull_updates_liveness() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    let before = db.get_device_by_token("dev-token-1").await.unwrap().unwrap();
    assert!(before.last_seen.is_none());
    assert!(!before.is_online(unix_timestamp(), 300));

    db.pull_messages("dev-token-1").await.unwrap();

    let after = db.get_device_by_token("dev-token-1").await.unwrap().unwrap();
    assert_eq!(after.poll_count, 1);
    assert!(after.last_seen.is_some());
    assert!(after.is_online(unix_timestamp(), 300));

    db.pull_messages("dev-token-1").await.unwrap();
    let later = db.get_device_by_token("dev-token-1").await.unwrap().unwrap();
    assert_eq!(later.poll_count, 2);
}

#[tokio::test]
async fn retention_cutoff_reclaims_unpulled_messages() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    db.push_message("dev-token-1", "esp1", "command", "stale", DIRECTION_TO_DEVICE)
        .await
        .unwrap();

    // Nothing older than epoch zero.
    assert_eq!(db.delete_messages_older_than(0).await.unwrap(), 0);

    // Cutoff in the future sweeps everything, pulled or not.
    let removed = db
        .delete_messages_older_than(unix_timestamp() + 10)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    assert!(db.pull_messages("dev-token-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_counters() {
    let db = test_db().await;
    seed_device(&db, "dev-token-1").await;

    db.push_message("dev-token-1", "esp1", "command", "aa", DIRECTION_TO_DEVICE)
        .await
        .unwrap();
    db.push_message("dev-token-1", "esp1", "response", "bb", DIRECTION_TO_CLIENT)
        .await
        .unwrap();

    assert_eq!(
        db.count_messages_by_direction(DIRECTION_TO_DEVICE).await.unwrap(),
        1
    );
    assert_eq!(
        db.count_messages_by_direction(DIRECTION_TO_CLIENT).await.unwrap(),
        1
    );
    assert_eq!(db.count_devices_seen_since(unix_timestamp() - 300).await.unwrap(), 0);

    db.pull_messages("dev-token-1").await.unwrap();
    assert_eq!(db.count_devices_seen_since(unix_timestamp() - 300).await.unwrap(), 1);
}
