use serde_json::{json, Value};
use std::net::TcpListener;
use uuid::Uuid;
use once_cell::sync::Lazy;
use reqwest::Client;
use secrecy::ExposeSecret;
use sqlx::{Connection, Executor, PgConnection, PgPool};

use memory_match_backend::run;
use memory_match_backend::config::jwt::JwtSettings;
use memory_match_backend::config::settings::{get_config, DatabaseSettings};
use memory_match_backend::db::{InMemoryAccountRepository, InMemoryScoreRepository};
use memory_match_backend::telemetry::{get_subscriber, init_subscriber};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink
        );
        init_subscriber(subscriber);
    }
});

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub scores: InMemoryScoreRepository,
    pub accounts: InMemoryAccountRepository,
}

pub struct TestUser {
    pub username: String,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let scores = InMemoryScoreRepository::new();
    let accounts = InMemoryAccountRepository::new();
    let server = run(
        listener,
        scores.clone(),
        accounts.clone(),
        JwtSettings::new(TEST_JWT_SECRET.to_string(), 1),
        Vec::new(),
    )
        .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);
    TestApp {
        address,
        scores,
        accounts,
    }
}

/// Fresh, migrated Postgres database named after a random UUID.
pub async fn spawn_pg_pool() -> PgPool {
    Lazy::force(&TRACING);

    let mut configuration = get_config().expect("Failed to read configuration.");
    configuration.database.db_name = Uuid::new_v4().to_string();
    configuration.database.db_url = None;
    configure_db(&configuration.database).await
}

pub async fn configure_db(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(
            config.connection_string_without_db().expose_secret()
        )
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.db_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect(config.connection_string().expose_secret())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

pub async fn create_test_user_and_login(app_address: &str) -> TestUser {
    let client = Client::new();
    let username = format!("player_{}", &Uuid::new_v4().simple().to_string()[..12]);
    let password = "password123";
    let email = format!("{}@example.com", username);

    let register_response = client
        .post(&format!("{}/auth/register", app_address))
        .json(&json!({
            "username": username,
            "password": password,
            "email": email
        }))
        .send()
        .await
        .expect("Failed to register user.");
    assert_eq!(register_response.status().as_u16(), 201);

    let login_response = client
        .post(&format!("{}/auth/login", app_address))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to execute login request.");

    let login_response: Value = login_response.json().await.expect("Failed to parse login response");
    let token = login_response["data"]["token"].as_str().expect("No token in response");

    TestUser {
        username,
        token: token.to_string(),
    }
}

pub fn score_body(player_name: &str, category: &str, difficulty: &str, time: i64, moves: i64) -> Value {
    json!({
        "playerName": player_name,
        "category": category,
        "difficulty": difficulty,
        "time": time,
        "moves": moves
    })
}

pub async fn submit_score(
    client: &Client,
    app_address: &str,
    token: &str,
    body: &Value,
) -> reqwest::Response {
    client
        .post(&format!("{}/scores", app_address))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .expect("Failed to submit score.")
}
