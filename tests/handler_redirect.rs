mod common;

use serde_json::json;

#[tokio::test]
async fn test_redirect_enabled_url() {
    let state = common::create_test_state().await;
    let server = common::test_server(state);

    let id = common::create_short_url(&server, "https://example.com/target").await;

    let response = server.get(&format!("/r/{id}")).await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_disabled_url_goes_to_disabled_page() {
    let state = common::create_test_state().await;
    let server = common::test_server(state.clone());

    let id = common::create_short_url(&server, "https://example.com/target").await;
    state.tasks.flush().await;
    server
        .patch(&format!("/urls/{id}"))
        .json(&json!({ "enabled": false }))
        .await
        .assert_status_ok();
    state.tasks.flush().await;

    let response = server.get(&format!("/r/{id}")).await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "/static/423.html");
}

#[tokio::test]
async fn test_redirect_unknown_id() {
    let state = common::create_test_state().await;
    let server = common::test_server(state);

    let response = server.get("/r/notfound").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_records_click() {
    let state = common::create_test_state().await;
    let server = common::test_server(state.clone());

    let id = common::create_short_url(&server, "https://example.com").await;

    for _ in 0..3 {
        assert_eq!(server.get(&format!("/r/{id}")).await.status_code(), 302);
    }

    assert_eq!(common::wait_for_clicks(&state, &id, 3).await, 3);
}

#[tokio::test]
async fn test_disabled_redirect_still_counts_click() {
    let state = common::create_test_state().await;
    let server = common::test_server(state.clone());

    let id = common::create_short_url(&server, "https://example.com").await;
    state.tasks.flush().await;
    server
        .patch(&format!("/urls/{id}"))
        .json(&json!({ "enabled": false }))
        .await
        .assert_status_ok();
    state.tasks.flush().await;

    server.get(&format!("/r/{id}")).await;

    assert_eq!(common::wait_for_clicks(&state, &id, 1).await, 1);
}
