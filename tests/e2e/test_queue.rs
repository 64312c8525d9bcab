use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use postcast_backend::domain::queue::StatusUpdate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_context::test_context;
use uuid::Uuid;

fn queue_ids(body: &Value) -> Vec<String> {
    body["queue_ids"]
        .as_array()
        .expect("queue_ids array")
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_enqueue_items_with_defaults_and_clamping(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/queue/add",
            &json!({
                "items": [
                    { "source_id": "abc123" },
                    { "content": { "title": "Inline story", "text": "Body" }, "priority": 42 },
                    { "source_id": "def456", "priority": -3, "subreddit": "r/tifu" }
                ]
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["total_in_queue"], json!(3));
    let ids = queue_ids(body);
    assert_eq!(ids.len(), 3);

    let first = ctx.client.get(&format!("/api/queue/items/{}", ids[0])).await.unwrap();
    first.assert_status(StatusCode::OK);
    assert_eq!(first.body()["priority"], json!(5));
    assert_eq!(first.body()["status"], json!("pending"));
    assert_eq!(first.body()["source"]["source_id"], json!("abc123"));

    let second = ctx.client.get(&format!("/api/queue/items/{}", ids[1])).await.unwrap();
    assert_eq!(second.body()["priority"], json!(10));

    let third = ctx.client.get(&format!("/api/queue/items/{}", ids[2])).await.unwrap();
    assert_eq!(third.body()["priority"], json!(1));
    assert_eq!(third.body()["subreddit"], json!("tifu"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_enqueue_post_ids_with_shared_priority(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/queue/add", &json!({ "post_ids": ["a1", "b2"], "priority": 8 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let status = ctx.client.get("/api/queue/status").await.unwrap();
    assert_eq!(status.body()["pending"], json!(2));
    assert_eq!(status.body()["by_priority"]["8"], json!(2));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_item_without_content_reference(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/queue/add", &json!({ "items": [{ "priority": 3 }] }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);

    let status = ctx.client.get("/api/queue/status").await.unwrap();
    assert_eq!(status.body()["total"], json!(0));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_and_ambiguous_requests(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({}))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("provide one of");

    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "post_ids": ["a"], "subreddit": "stories" }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("mutually exclusive");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_enqueue_subreddit_listing_by_score(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/queue/add",
            &json!({ "subreddit": "AskReddit", "sort": "top", "min_score": 100 }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(queue_ids(response.body()).len(), 2);

    let status = ctx.client.get("/api/queue/status").await.unwrap();
    let body = status.body();
    assert_eq!(body["by_priority"]["10"], json!(1));
    assert_eq!(body["by_priority"]["3"], json!(1));
    assert_eq!(body["by_subreddit"]["AskReddit"], json!(2));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_subreddit(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "subreddit": "doesnotexist" }))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_items_in_insertion_order(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "items": [
                { "source_id": "low", "priority": 1 },
                { "source_id": "high", "priority": 9 },
                { "source_id": "mid", "priority": 5 }
            ] }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get("/api/queue/items?status=pending&limit=2").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["count"], json!(2));
    let sources: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["source"]["source_id"].as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["low", "high"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_status_filter(ctx: &TestContext) {
    ctx.client
        .get("/api/queue/items?status=done")
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("unknown status");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_item(ctx: &TestContext) {
    ctx.client
        .get(&format!("/api/queue/items/{}", Uuid::new_v4()))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_never_clear_processing_items(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": ["a", "b", "c"] }))
        .await
        .unwrap();
    // Simulate a pass that is still running
    ctx.store.claim_batch(2);

    let response = ctx.client.delete("/api/queue/clear?status=processing").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["removed"], json!(0));

    let response = ctx.client.delete("/api/queue/clear?status=all").await.unwrap();
    assert_eq!(response.body()["removed"], json!(1));

    let status = ctx.client.get("/api/queue/status").await.unwrap();
    assert_eq!(status.body()["processing"], json!(2));
    assert_eq!(status.body()["total"], json!(2));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_status_to_clear(ctx: &TestContext) {
    ctx.client
        .delete("/api/queue/clear")
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("status is required");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_retry_failed_items_as_new_items(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/queue/add", &json!({ "post_ids": ["a"] }))
        .await
        .unwrap();
    let original = queue_ids(response.body()).remove(0);
    let original_id: Uuid = original.parse().unwrap();

    ctx.store.claim_batch(1);
    ctx.store
        .update(original_id, StatusUpdate::Failed("engine down".to_string()))
        .unwrap();

    let response = ctx.client.post_empty("/api/queue/retry").await.unwrap();
    response.assert_status(StatusCode::OK);
    let retried = queue_ids(response.body());
    assert_eq!(retried.len(), 1);
    assert_ne!(retried[0], original);

    let retry = ctx.client.get(&format!("/api/queue/items/{}", retried[0])).await.unwrap();
    assert_eq!(retry.body()["status"], json!("pending"));
    assert_eq!(retry.body()["attempt"], json!(2));
    assert_eq!(retry.body()["retry_of"], json!(original));

    let old = ctx.client.get(&format!("/api/queue/items/{}", original)).await.unwrap();
    assert_eq!(old.body()["status"], json!("failed"));

    // The same failure cannot be requeued twice
    ctx.client
        .post_empty(&format!("/api/queue/items/{}/retry", original))
        .await
        .unwrap()
        .assert_status(StatusCode::CONFLICT);
}
