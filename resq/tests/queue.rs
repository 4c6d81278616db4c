//! Queue engine tests
//!
//! Tests the FIFO queue operations:
//! - Push/pop ordering and uuids
//! - Peek, size and queue listing
//! - Queue removal and key introspection
//! - Concurrent reservation

mod common;

use common::memory_client;
use serde_json::json;
use std::collections::HashSet;

#[tokio::test]
async fn test_people_scenario() {
    let client = memory_client().await;

    client.push("people", json!({"name": "chris"})).await.unwrap();
    client.push("people", json!({"name": "bob"})).await.unwrap();
    client.push("people", json!({"name": "mark"})).await.unwrap();

    assert_eq!(client.size("people").await.unwrap(), 3);
    assert_eq!(client.pop("people").await.unwrap().unwrap(), json!({"name": "chris"}));
    assert_eq!(client.pop("people").await.unwrap().unwrap(), json!({"name": "bob"}));
    assert_eq!(client.pop("people").await.unwrap().unwrap(), json!({"name": "mark"}));
    assert!(client.pop("people").await.unwrap().is_none());
}

#[tokio::test]
async fn test_push_returns_uuid_seen_by_peek_and_pop() {
    let client = memory_client().await;

    let uuid = client.push("people", json!({"name": "chris"})).await.unwrap();
    assert_eq!(uuid.len(), 32);
    assert!(uuid.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

    let peeked = client.peek("people", 0, 1).await.unwrap().one().unwrap();
    assert_eq!(peeked.uuid(), uuid);

    let popped = client.pop("people").await.unwrap().unwrap();
    assert_eq!(popped.uuid(), uuid);
}

#[tokio::test]
async fn test_record_without_uuid_keeps_identity_across_reads() {
    let client = memory_client().await;
    let key = client.layout().queue("jobs");
    client
        .store()
        .push(&key, r#"{"class":"GoodJob","args":["bot"]}"#.to_string())
        .await
        .unwrap();

    let first = client.peek("jobs", 0, 1).await.unwrap().one().unwrap();
    let second = client.peek("jobs", 0, 1).await.unwrap().one().unwrap();
    assert_eq!(first.uuid(), second.uuid());

    client.set_status(first.uuid(), "seen").await.unwrap();

    let job = client.reserve("jobs").await.unwrap().unwrap();
    assert_eq!(job.uuid(), first.uuid());
    assert_eq!(job.status(&client).await.unwrap(), Some(json!("seen")));
}

#[tokio::test]
async fn test_peek_matches_pop_order_without_mutating() {
    let client = memory_client().await;
    for name in ["chris", "bob", "mark"] {
        client.push("people", json!({ "name": name })).await.unwrap();
    }

    let peeked: Vec<_> = peek_each(&client).await;
    assert_eq!(client.size("people").await.unwrap(), 3);

    for expected in peeked {
        let popped = client.pop("people").await.unwrap().unwrap();
        assert_eq!(popped, expected);
    }
}

async fn peek_each(client: &resq::Client) -> Vec<resq::Payload> {
    let mut peeked = Vec::new();
    for i in 0..3 {
        peeked.push(client.peek("people", i, 1).await.unwrap().one().unwrap());
    }
    peeked
}

#[tokio::test]
async fn test_peek_out_of_range_is_empty() {
    let client = memory_client().await;
    client.push("people", json!({"name": "chris"})).await.unwrap();

    assert!(client.peek("people", 1, 1).await.unwrap().one().is_none());
    assert!(client.peek("people", 5, 3).await.unwrap().many().is_empty());
    assert!(client.peek("nobody", 0, 1).await.unwrap().is_empty());
    assert_eq!(client.peek("people", 0, 10).await.unwrap().many().len(), 1);

    client.push("people", json!({"name": "mark"})).await.unwrap();
    assert!(client.peek("people", usize::MAX, 1).await.unwrap().one().is_none());
    assert!(client.peek("people", usize::MAX - 1, 2).await.unwrap().many().is_empty());
    assert_eq!(client.peek("people", 1, usize::MAX).await.unwrap().many().len(), 1);
}

#[tokio::test]
async fn test_queue_listing_is_sorted() {
    let client = memory_client().await;
    client.push("people", json!({"name": "bob"})).await.unwrap();
    client.push("cars", json!({"make": "bmw"})).await.unwrap();
    client.push("people", json!({"name": "mark"})).await.unwrap();

    assert_eq!(client.queues().await.unwrap(), vec!["cars", "people"]);
}

#[tokio::test]
async fn test_remove_queue_is_idempotent() {
    let client = memory_client().await;
    client.push("people", json!({"name": "bob"})).await.unwrap();
    client.push("cars", json!({"make": "bmw"})).await.unwrap();

    client.remove_queue("people").await.unwrap();
    let after_once = client.keys().await.unwrap();
    client.remove_queue("people").await.unwrap();

    assert_eq!(client.keys().await.unwrap(), after_once);
    assert_eq!(client.queues().await.unwrap(), vec!["cars"]);
    assert!(client.pop("people").await.unwrap().is_none());
}

#[tokio::test]
async fn test_keys_lists_namespaced_keys() {
    let client = memory_client().await;
    client.push("people", json!({"name": "bob"})).await.unwrap();
    client.push("cars", json!({"make": "bmw"})).await.unwrap();

    assert_eq!(
        client.keys().await.unwrap(),
        vec!["queue:cars", "queue:people", "queues"]
    );
}

#[tokio::test]
async fn test_find_queued_payload() {
    let client = memory_client().await;
    let uuid = client.push("people", json!({"name": "bob"})).await.unwrap();

    let found = client.find(&uuid).await.unwrap().unwrap();
    assert_eq!(found, json!({"name": "bob"}));

    client.pop("people").await.unwrap();
    assert!(client.find(&uuid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_status_survives_pop() {
    let client = memory_client().await;
    let uuid = client.push("people", json!({"name": "bob"})).await.unwrap();

    client.set_status(&uuid, "working").await.unwrap();
    client.pop("people").await.unwrap();

    assert_eq!(client.get_status(&uuid).await.unwrap(), Some(json!("working")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pops_deliver_each_payload_once() {
    let client = memory_client().await;
    let total = 50;

    let mut pushed = HashSet::new();
    for i in 0..total {
        pushed.insert(client.push("jobs", json!({ "n": i })).await.unwrap());
    }

    let handles: Vec<_> = (0..total)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.pop("jobs").await.unwrap() })
        })
        .collect();

    let mut popped = HashSet::new();
    for handle in handles {
        let payload = handle.await.unwrap().expect("each pop gets a payload");
        assert!(popped.insert(payload.uuid().to_string()), "duplicate delivery");
    }

    assert_eq!(popped, pushed);
    assert!(client.pop("jobs").await.unwrap().is_none());
}
