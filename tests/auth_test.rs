use reqwest::Client;
use serde_json::{json, Value};

mod common;
use common::utils::{create_test_user_and_login, spawn_app};

#[tokio::test]
async fn register_user_working() {
    let test_app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/auth/register", &test_app.address))
        .json(&json!({
            "username": "memory_ann",
            "email": "Ann@Example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["username"], "memory_ann");
    assert_eq!(body["data"]["user"]["email"], "ann@example.com");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"]["joinDate"].is_string());
}

#[tokio::test]
async fn duplicate_username_or_email_is_conflict() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let register = |username: &str, email: &str| {
        client
            .post(format!("{}/auth/register", &test_app.address))
            .json(&json!({ "username": username, "email": email, "password": "password123" }))
            .send()
    };

    assert_eq!(register("ann", "ann@example.com").await.unwrap().status().as_u16(), 201);
    assert_eq!(register("ANN", "other@example.com").await.unwrap().status().as_u16(), 409);
    assert_eq!(register("bob", "ann@example.com").await.unwrap().status().as_u16(), 409);
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let test_app = spawn_app().await;
    let client = Client::new();

    let cases = [
        json!({ "username": "a", "email": "a@example.com", "password": "password123" }),
        json!({ "username": "valid_name", "email": "not-an-email", "password": "password123" }),
        json!({ "username": "valid_name", "email": "a@example.com", "password": "123" }),
        json!({ "username": "valid_name", "email": "a@example.com" }),
    ];
    for case in cases {
        let response = client
            .post(&format!("{}/auth/register", &test_app.address))
            .json(&case)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "{}", case);
    }
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let user = create_test_user_and_login(&test_app.address).await;

    let response = client
        .post(&format!("{}/auth/login", &test_app.address))
        .json(&json!({ "username": user.username, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn me_returns_profile_with_last_login() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let user = create_test_user_and_login(&test_app.address).await;

    let response = client
        .get(&format!("{}/auth/me", &test_app.address))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], user.username.as_str());
    assert!(body["data"]["lastLogin"].is_string());
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let test_app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(&format!("{}/auth/me", &test_app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}
