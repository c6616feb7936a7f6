mod common;

use serde_json::Value;

async fn seed(server: &axum_test::TestServer, state: &short_url::AppState, clicks: &[i64]) {
    for (i, count) in clicks.iter().enumerate() {
        let id = common::create_short_url(server, &format!("https://example.com/{i}")).await;
        if *count > 0 {
            state.record_store.increment_clicks(&id, *count).await.unwrap();
        }
    }
}

fn clicks_of(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["clicks"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_stats_orders_by_clicks() {
    let state = common::create_test_state().await;
    let server = common::test_server(state.clone());
    seed(&server, &state, &[5, 50, 0, 20]).await;

    let response = server.get("/stats").add_query_param("limit", 3).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(clicks_of(&response.json()), vec![50, 20, 5]);
}

#[tokio::test]
async fn test_stats_default_limit_is_ten() {
    let state = common::create_test_state().await;
    let server = common::test_server(state.clone());
    seed(&server, &state, &[1; 12]).await;

    for path in ["/stats", "/stats?limit=0", "/stats?limit=-5", "/stats?limit=abc"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), 200, "path: {path}");
        assert_eq!(clicks_of(&response.json()).len(), 10, "path: {path}");
    }
}

#[tokio::test]
async fn test_stats_empty() {
    let state = common::create_test_state().await;
    let server = common::test_server(state);

    let body: Value = server.get("/stats").await.json();

    assert_eq!(body, serde_json::json!([]));
}
