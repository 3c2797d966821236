// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use quizmaster::{
    config::Config,
    routes,
    state::AppState,
    store::{MIGRATOR, SqliteCatalog, connect_pool},
};
use reqwest::{Client, Response, redirect::Policy};

pub struct TestApp {
    pub address: String,
    pub catalog: SqliteCatalog,
}

/// Spawns the app on a random port, backed by a seeded in-memory database.
pub async fn spawn_app() -> TestApp {
    // 1. One connection keeps the in-memory database alive and shared
    let pool = connect_pool("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory SQLite");

    // 2. Run migrations and seed the catalog
    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let catalog = SqliteCatalog::new(pool);
    catalog.seed_if_empty().await.expect("Failed to seed catalog");

    // 3. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "test_secret_for_integration_tests".to_string(),
        session_ttl: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
    };

    let state = AppState::new(Arc::new(catalog.clone()), config);
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, catalog }
}

/// A browser-like client: keeps cookies, does not follow redirects.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, client: &Client, username: &str, email: &str) -> Response {
        client
            .post(self.url("/auth"))
            .form(&[
                ("action", "register"),
                ("username", username),
                ("email", email),
                ("password", "password123"),
            ])
            .send()
            .await
            .expect("Register request failed")
    }

    pub async fn login(&self, client: &Client, username: &str, password: &str) -> Response {
        client
            .post(self.url("/auth"))
            .form(&[
                ("action", "login"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await
            .expect("Login request failed")
    }

    /// Registers a fresh user on `client` and returns the username.
    pub async fn signed_in_user(&self, client: &Client) -> String {
        let username = unique_name("u");
        let response = self
            .register(client, &username, &format!("{username}@example.com"))
            .await;
        assert_eq!(location(&response), "/dashboard");
        username
    }

    pub async fn get_json(&self, client: &Client, path: &str) -> (u16, serde_json::Value) {
        let response = client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    /// Flash messages currently queued for the client's session.
    pub async fn flashes(&self, client: &Client) -> Vec<String> {
        let (_, body) = self.get_json(client, "/auth").await;
        body["messages"]
            .as_array()
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m["message"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn quiz_id_by_title(&self, title: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM quizzes WHERE title = ?")
            .bind(title)
            .fetch_one(self.catalog.pool())
            .await
            .expect("Quiz not seeded")
    }
}
