use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode as AxumStatus};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use contentforge::config::{Config, GenerationConfig};
use contentforge::generation::OpenAiGenerator;

pub const API_KEY: &str = "test-provider-key";

/// A running test server instance with a dedicated test database and a fake
/// text-generation provider.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub provider: FakeProvider,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a project, return the project JSON.
    pub async fn create_project(&self, title: &str) -> Value {
        let (body, status) = self
            .post_json(
                "/api/v1/projects",
                &json!({ "title": title, "owner_id": "user_123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create project failed: {body}");
        body
    }

    /// Add a text asset to a project, return the asset JSON.
    pub async fn create_asset(&self, project_id: &str, title: &str, content: &str) -> Value {
        let (body, status) = self
            .post_json(
                &format!("/api/v1/projects/{project_id}/assets"),
                &json!({ "title": title, "content": content }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create asset failed: {body}");
        body
    }

    /// Create a prompt under a project, return the prompt JSON.
    pub async fn create_prompt(&self, project_id: &str, name: &str, prompt: &str, order: i32) -> Value {
        let (body, status) = self
            .post_json(
                &format!("/api/v1/projects/{project_id}/prompts"),
                &json!({ "name": name, "prompt": prompt, "order": order }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create prompt failed: {body}");
        body
    }

    /// Trigger a generation run for a project.
    pub async fn generate(&self, project_id: &str) -> (Value, StatusCode) {
        self.post_json(
            &format!("/api/v1/projects/{project_id}/generated-content"),
            &json!({}),
        )
        .await
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("patch request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// OpenAI-compatible stand-in. Behaviour is chosen by model name:
/// `rate-limited*` → 429, `unavailable*` → 503, `overloaded*` → 500 with an
/// overload message, `broken*` → 400, `slow*` → sleeps past any test timeout.
/// A prompt containing `FATAL` is rejected with 400 whatever the model.
/// Anything else succeeds with `[model] <prompt line>`.
#[derive(Clone)]
pub struct FakeProvider {
    pub url: String,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn spawn_provider() -> FakeProvider {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/chat/completions", post(fake_completion))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake provider");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake provider failed");
    });

    FakeProvider {
        url: format!("http://{addr}"),
        calls,
    }
}

async fn fake_completion(
    State(calls): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Json(req): Json<Value>,
) -> impl IntoResponse {
    calls.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {API_KEY}"))
        .unwrap_or(false);
    if !authorized {
        return error(AxumStatus::UNAUTHORIZED, "invalid api key");
    }

    let model = req["model"].as_str().unwrap_or_default().to_string();
    let prompt = req["messages"][1]["content"].as_str().unwrap_or_default();

    if prompt.contains("FATAL") {
        return error(AxumStatus::BAD_REQUEST, "prompt rejected by content filter");
    }
    if model.starts_with("rate-limited") {
        return error(AxumStatus::TOO_MANY_REQUESTS, "rate limit reached");
    }
    if model.starts_with("unavailable") {
        return error(AxumStatus::SERVICE_UNAVAILABLE, "service unavailable");
    }
    if model.starts_with("overloaded") {
        return error(AxumStatus::INTERNAL_SERVER_ERROR, "the engine is currently overloaded");
    }
    if model.starts_with("broken") {
        return error(AxumStatus::BAD_REQUEST, "unknown model");
    }
    if model.starts_with("slow") {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }

    let prompt_line = prompt
        .split("** PROMPT:\n")
        .nth(1)
        .and_then(|rest| rest.lines().next())
        .unwrap_or_default();

    (
        AxumStatus::OK,
        Json(json!({
            "id": "chatcmpl-test",
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": format!("[{model}] {prompt_line}") },
                "finish_reason": "stop"
            }]
        })),
    )
}

fn error(status: AxumStatus, message: &str) -> (AxumStatus, Json<Value>) {
    (status, Json(json!({ "error": { "message": message } })))
}

/// Spawn a test app with the default candidates, all healthy.
#[allow(dead_code)]
pub async fn spawn_app() -> TestApp {
    spawn_app_with(&["primary", "secondary", "tertiary"], |_| {}).await
}

/// Spawn a test app with a fresh temporary database and the given candidates.
pub async fn spawn_app_with(models: &[&str], tweak: impl FnOnce(&mut GenerationConfig)) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("contentforge_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let provider = spawn_provider().await;

    let mut generation = GenerationConfig {
        api_key: API_KEY.to_string(),
        provider_url: provider.url.clone(),
        models: models.iter().map(|m| m.to_string()).collect(),
        system_prompt: contentforge::config::DEFAULT_SYSTEM_PROMPT.to_string(),
        provider_timeout: Duration::from_secs(5),
        run_timeout: Duration::from_secs(5),
        max_chunk_tokens: 8000,
        rate_limit: 100,
        rate_limit_window_secs: 60,
    };
    tweak(&mut generation);

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
        generation,
    };

    let generator = OpenAiGenerator::new(&config.generation).expect("provider client");
    let state = contentforge::build_state(pool.clone(), config, Arc::new(generator));
    let app = contentforge::build_app(state);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
        provider,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
