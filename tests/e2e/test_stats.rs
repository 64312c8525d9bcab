use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_empty_summary(ctx: &TestContext) {
    let response = ctx.client.get("/api/stats/summary").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body(),
        &json!({
            "artifacts": 0,
            "total_duration_seconds": 0.0,
            "total_size_bytes": 0,
            "items_processed_all_time": 0,
            "average_duration_seconds": 0.0,
            "average_size_bytes": 0.0
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_summarize_completed_artifacts(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "post_ids": ["a", "b", "c", "broken"] }),
        )
        .await
        .unwrap();
    ctx.client.post_empty("/api/queue/process").await.unwrap();

    let response = ctx.client.get("/api/stats/summary").await.unwrap();
    let body = response.body();
    assert_eq!(body["artifacts"], json!(3));
    assert_eq!(body["total_duration_seconds"], json!(30.0));
    assert_eq!(body["total_size_bytes"], json!(300_000));
    assert_eq!(body["items_processed_all_time"], json!(4));
    assert_eq!(body["average_size_bytes"], json!(100_000.0));

    // Clearing completed items keeps the all-time counter
    ctx.client.delete("/api/queue/clear?status=completed").await.unwrap();
    let response = ctx.client.get("/api/stats/summary").await.unwrap();
    assert_eq!(response.body()["artifacts"], json!(0));
    assert_eq!(response.body()["items_processed_all_time"], json!(4));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_identical_stats_without_mutation(ctx: &TestContext) {
    ctx.client
        .post("/api/queue/add", &json!({ "post_ids": ["a", "b"] }))
        .await
        .unwrap();
    ctx.client
        .post("/api/queue/process", &json!({ "max_items": 1 }))
        .await
        .unwrap();

    let first = ctx.client.get("/api/stats/summary").await.unwrap();
    let second = ctx.client.get("/api/stats/summary").await.unwrap();
    assert_eq!(first.body(), second.body());

    let first = ctx.client.get("/api/stats/queue").await.unwrap();
    let second = ctx.client.get("/api/stats/queue").await.unwrap();
    assert_eq!(first.body(), second.body());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_break_down_queue_by_priority_and_subreddit(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/queue/add",
            &json!({ "items": [
                { "source_id": "a", "priority": 7, "subreddit": "tifu" },
                { "source_id": "b", "priority": 7 },
                { "content": { "title": "Inline", "subreddit": "stories" } }
            ] }),
        )
        .await
        .unwrap();

    let response = ctx.client.get("/api/stats/queue").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["by_priority"], json!({ "5": 1, "7": 2 }));
    assert_eq!(
        body["by_subreddit"],
        json!({ "stories": 1, "tifu": 1, "unknown": 1 })
    );
}
