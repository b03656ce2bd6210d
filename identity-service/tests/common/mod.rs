use std::sync::Arc;

use auth::Authenticator;
use auth::HashingParams;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Utc;
use identity_service::domain::user::gate::AuthGate;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use serde_json::json;
use serde_json::Value;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: InMemoryUserRepository,
    pub clock: Arc<ManualClock>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = InMemoryUserRepository::new();
        let clock = Arc::new(ManualClock::new(Utc::now()));

        // Cheap Argon2 cost keeps the suite fast
        let password_hasher = PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to create password hasher");
        let token_codec = TokenCodec::new(JWT_SECRET).with_clock(clock.clone());
        let authenticator = Arc::new(Authenticator::new(password_hasher, token_codec));

        let user_repository = Arc::new(repository.clone());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repository),
            Arc::clone(&authenticator),
        ));
        let auth_gate = Arc::new(AuthGate::new(user_repository, Arc::clone(&authenticator)));

        let router = create_router(auth_service, auth_gate);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            clock,
            authenticator,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and return the raw response
    pub async fn register(&self, body: Value) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the raw response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in with known-good credentials and return the access token
    pub async fn access_token(&self, username: &str, password: &str) -> String {
        let body: Value = self
            .login(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");

        body["access_token"]
            .as_str()
            .expect("Login did not return a token")
            .to_string()
    }
}

/// Registration body for the reference user
pub fn john_doe() -> Value {
    json!({
        "first_name": "John",
        "last_name": "Doe",
        "email": "john@example.com",
        "username": "johndoe",
        "password": "Secure123"
    })
}

/// Throwaway PostgreSQL database with migrations applied
pub struct TestDb {
    pub pg_pool: PgPool,
    pub pg_db_name: String,
    admin_url: String,
}

impl TestDb {
    /// Create a uniquely named database on the server at `DATABASE_URL`.
    ///
    /// Returns `None` when `DATABASE_URL` is unset so the suite still runs
    /// without a database server.
    pub async fn new() -> Option<Self> {
        let Ok(admin_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let uuid_suffix = uuid::Uuid::new_v4().to_string().replace('-', "_");
        let pg_db_name = format!("test_identity_{}", uuid_suffix);

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, pg_db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = admin_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&pg_db_name);

        let pg_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pg_pool,
            pg_db_name,
            admin_url,
        })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let pg_db_name = self.pg_db_name.clone();
        let admin_url = self.admin_url.clone();
        let pg_pool = self.pg_pool.clone();

        tokio::spawn(async move {
            pg_pool.close().await;

            if let Ok(mut conn) = PgConnection::connect(&admin_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            pg_db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, pg_db_name).as_str())
                    .await;
            }
        });
    }
}
