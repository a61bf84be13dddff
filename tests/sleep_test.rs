use reqwest::Client;
use serde_json::json;

mod common;
use common::utils::{create_test_user, spawn_app};

#[tokio::test]
async fn overnight_sleep_is_stored_with_derived_duration() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (user_id, token) = create_test_user();

    let response = client
        .post(test_app.url("/api/sleep"))
        .bearer_auth(&token)
        .json(&json!({
            "userId": user_id,
            "startTime": "2024-01-01T22:00",
            "endTime": "2024-01-02T06:00"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["duration"].as_f64(), Some(8.0));
    assert_eq!(body["date"], "2024-01-02");
}

#[tokio::test]
async fn sleep_ending_before_it_starts_is_rejected_and_not_stored() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (user_id, token) = create_test_user();

    let response = client
        .post(test_app.url("/api/sleep"))
        .bearer_auth(&token)
        .json(&json!({
            "userId": user_id,
            "startTime": "2024-01-02T06:00",
            "endTime": "2024-01-01T22:00"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error["error"], "ValidationError");
    assert!(error["message"].as_str().unwrap().contains("endTime"));

    let response = client
        .get(test_app.url(&format!("/api/sleep?userId={}", user_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["summary"]["count"], 0);
}

#[tokio::test]
async fn sleep_with_malformed_timestamp_is_a_validation_error() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (user_id, token) = create_test_user();

    let response = client
        .post(test_app.url("/api/sleep"))
        .bearer_auth(&token)
        .json(&json!({
            "userId": user_id,
            "startTime": "last night",
            "endTime": "2024-01-02T06:00"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error["error"], "ValidationError");
    assert!(error["message"].as_str().unwrap().contains("startTime"));
}

#[tokio::test]
async fn sleep_summary_averages_durations() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (user_id, token) = create_test_user();

    for (start, end) in [
        ("2024-01-01T22:00", "2024-01-02T06:00"),
        ("2024-01-02T23:00", "2024-01-03T05:00"),
    ] {
        let response = client
            .post(test_app.url("/api/sleep"))
            .bearer_auth(&token)
            .json(&json!({ "userId": user_id, "startTime": start, "endTime": end }))
            .send()
            .await
            .unwrap();
        assert_eq!(201, response.status().as_u16());
    }

    let body: serde_json::Value = client
        .get(test_app.url(&format!("/api/sleep?userId={}&period=none", user_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["summary"]["count"], 2);
    assert_eq!(body["summary"]["total"].as_f64(), Some(14.0));
    assert_eq!(body["summary"]["average"].as_f64(), Some(7.0));
    assert_eq!(body["samples"][0]["date"], "2024-01-02");
    assert_eq!(body["samples"][1]["date"], "2024-01-03");
}
