pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Asserts a structured error response and returns its payload.
pub async fn expect_error(
    response: axum::response::Response,
    status: axum::http::StatusCode,
    code: &str,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], code);
    payload
}
