use chrono::Utc;
use reqwest::Client;
use serde_json::json;

mod common;
use common::utils::{create_test_user, sign_token, spawn_app, TEST_JWT_SECRET};

#[tokio::test]
async fn api_routes_require_a_bearer_token() {
    let test_app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(test_app.url("/api/water?userId=someone"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error["success"], false);
    assert_eq!(error["error"], "AuthenticationError");
}

#[tokio::test]
async fn invalid_tokens_are_rejected() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let expired = sign_token("user_1", TEST_JWT_SECRET, Utc::now().timestamp() - 3600);
    let wrong_secret = sign_token("user_1", "some-other-secret", Utc::now().timestamp() + 3600);

    for (header, description) in [
        ("Bearer not-a-jwt".to_string(), "garbage token"),
        (format!("Bearer {}", expired), "expired token"),
        (format!("Bearer {}", wrong_secret), "wrong signing key"),
        (format!("Token {}", wrong_secret), "wrong scheme"),
    ] {
        let response = client
            .post(test_app.url("/api/water"))
            .header("Authorization", header)
            .json(&json!({ "userId": "user_1", "amount": 100 }))
            .send()
            .await
            .unwrap();

        assert_eq!(401, response.status().as_u16(), "case: {}", description);
    }
}

#[tokio::test]
async fn users_cannot_touch_each_others_records() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();
    let (other_user, _) = create_test_user();

    let response = client
        .post(test_app.url("/api/water"))
        .bearer_auth(&token)
        .json(&json!({ "userId": other_user, "amount": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = client
        .get(test_app.url(&format!("/api/sleep?userId={}", other_user)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error["error"], "ForbiddenError");
}
