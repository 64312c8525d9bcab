use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_process_batch_end_to_end(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "items": [
                { "content": { "title": "First", "text": "A calm story about a garden." }, "priority": 5 },
                { "content": { "title": "Second", "text": "Another story about a lake." }, "priority": 1 }
            ] }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post("/api/queue/process", &json!({ "max_items": 2, "engine": "default" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body(),
        &json!({ "processed": 2, "successful": 2, "failed": 0 })
    );

    let status = ctx.client.get("/api/queue/status").await.unwrap();
    let body = status.body();
    assert_eq!(
        (
            &body["completed"],
            &body["pending"],
            &body["processing"],
            &body["failed"]
        ),
        (&json!(2), &json!(0), &json!(0), &json!(0))
    );

    let stats = ctx.client.get("/api/stats/summary").await.unwrap();
    assert_eq!(stats.body()["total_duration_seconds"], json!(20.0));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_process_highest_priority_first(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "post_ids": ["low"], "priority": 1 }),
        )
        .await
        .unwrap();
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "post_ids": ["high"], "priority": 9 }),
        )
        .await
        .unwrap();

    let response = ctx
        .client
        .post("/api/queue/process", &json!({ "max_items": 1 }))
        .await
        .unwrap();
    assert_eq!(response.body()["processed"], json!(1));

    let completed = ctx.client.get("/api/queue/items?status=completed").await.unwrap();
    let items = completed.body()["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["source"]["source_id"], json!("high"));
    assert!(items[0]["output"]["reference"].as_str().unwrap().ends_with(".mp3"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_isolate_failing_items(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "post_ids": ["ok-1", "broken", "missing", "ok-2"] }),
        )
        .await
        .unwrap();

    let response = ctx.client.post_empty("/api/queue/process").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body(),
        &json!({ "processed": 4, "successful": 2, "failed": 2 })
    );

    let failed = ctx.client.get("/api/queue/items?status=failed").await.unwrap();
    let errors: Vec<&str> = failed.body()["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["error"].as_str().unwrap())
        .collect();
    assert_eq!(
        errors,
        vec![
            "content unavailable: upstream returned 503",
            "content unavailable: post missing not found"
        ]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_items_rejected_by_engine(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": ["a"] }))
        .await
        .unwrap();

    let response = ctx
        .client
        .post("/api/queue/process", &json!({ "engine": "rejecting" }))
        .await
        .unwrap();

    assert_eq!(response.body()["failed"], json!(1));
    let failed = ctx.client.get("/api/queue/items?status=failed").await.unwrap();
    assert_eq!(
        failed.body()["items"][0]["error"],
        json!("speech engine rejected input: voice not available")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_zero_summary_for_empty_queue(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/queue/process", &json!({ "max_items": 5 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body(),
        &json!({ "processed": 0, "successful": 0, "failed": 0 })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_process_requests(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": ["a"] }))
        .await
        .unwrap();

    ctx.client
        .post("/api/queue/process", &json!({ "max_items": 0 }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("max_items");

    ctx.client
        .post("/api/queue/process", &json!({ "engine": "kokoro" }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("unknown engine 'kokoro'");

    // Nothing was claimed by the rejected calls
    let status = ctx.client.get("/api/queue/status").await.unwrap();
    assert_eq!(status.body()["pending"], json!(1));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_process_bodies(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": ["a", "b"] }))
        .await
        .unwrap();

    ctx.client
        .post("/api/queue/process", &json!({ "max_items": -1 }))
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("invalid process request");

    ctx.client
        .post(
            "/api/queue/process",
            &json!({ "max_items": "two", "engine": "kokoro" }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("invalid process request");

    let status = ctx.client.get("/api/queue/status").await.unwrap();
    assert_eq!(status.body()["pending"], json!(2));
    assert_eq!(status.body()["completed"], json!(0));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_double_claim_across_concurrent_passes(ctx: &TestContext) {
    let post_ids: Vec<String> = (0..12).map(|i| format!("post-{}", i)).collect();
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": post_ids }))
        .await
        .unwrap();

    let mut passes = Vec::new();
    for _ in 0..4 {
        let client = ctx.client.clone();
        passes.push(async move {
            client
                .post("/api/queue/process", &json!({ "max_items": 5 }))
                .await
        });
    }

    let processed: u64 = futures::future::join_all(passes)
        .await
        .into_iter()
        .map(|result| result.unwrap().body()["processed"].as_u64().unwrap())
        .sum();

    assert_eq!(processed, 12);
    let status = ctx.client.get("/api/queue/status").await.unwrap();
    assert_eq!(status.body()["completed"], json!(12));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_filtered_content_without_synthesis(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": ["removed", "nsfw", "fine"] }))
        .await
        .unwrap();

    let response = ctx.client.post_empty("/api/queue/process").await.unwrap();
    assert_eq!(
        response.body(),
        &json!({ "processed": 3, "successful": 1, "failed": 2 })
    );

    let failed = ctx.client.get("/api/queue/items?status=failed").await.unwrap();
    let errors: Vec<&str> = failed.body()["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["error"].as_str().unwrap())
        .collect();
    assert_eq!(
        errors,
        vec![
            "content filtered as unsafe: post was removed or deleted",
            "content filtered as unsafe: post nsfw is marked NSFW"
        ]
    );
}
