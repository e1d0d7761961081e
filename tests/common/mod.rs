//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure. Every [`TestApp`]
//! runs the full router over a fresh in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use fake::faker::internet::en::Username;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use sociostack::config::{
    CorsSettings, DatabaseSettings, ImageSettings, JwtSettings, RedisSettings, ServerSettings,
    Settings, StoreBackend, WebSocketSettings,
};
use sociostack::infrastructure::images::DisabledImageHost;
use sociostack::startup::{build_router, AppState};

pub const PASSWORD: &str = "Passw0rd!";
pub const COOKIE_NAME: &str = "jwt";

/// Settings for a single-process app over the in-memory store
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            backend: StoreBackend::Memory,
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
            run_migrations: false,
        },
        redis: RedisSettings {
            url: None,
            channel_prefix: "test:user:".into(),
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-with-enough-length".into(),
            expiry_days: 15,
            cookie_name: COOKIE_NAME.into(),
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            max_frame_size: 16384,
        },
        images: ImageSettings {
            cloud_name: None,
            api_key: String::new(),
            api_secret: String::new(),
            api_base_url: "https://images.invalid/v1_1".into(),
            default_image_url: "https://images.invalid/blank.png".into(),
        },
        environment: "development".into(),
    }
}

/// Response as seen by a test
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `message` field of the JSON body
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// A signed-up account and its session token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_state(AppState::in_memory(
            test_settings(),
            Arc::new(DisabledImageHost),
        ))
    }

    /// Serve a prepared state
    pub fn with_state(state: AppState) -> Self {
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    /// Send one request through the router
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a fresh account with a generated username
    pub async fn signup(&self) -> TestUser {
        let username = unique_username();
        let email = format!("{}@example.com", username);
        let name: String = Name().fake();

        let response = self
            .post(
                "/api/auth/signup",
                None,
                json!({
                    "username": username,
                    "name": name,
                    "email": email,
                    "password": PASSWORD,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        TestUser {
            id: response.body["id"].as_str().unwrap().parse().unwrap(),
            username,
            email,
            token: session_cookie(&response.headers).unwrap(),
        }
    }

    /// Create a post and return its id
    pub async fn create_post(&self, user: &TestUser, title: &str) -> Uuid {
        let response = self
            .post(
                "/api/post/create",
                Some(&user.token),
                json!({ "title": title, "description": "Some words" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().parse().unwrap()
    }

    /// Send a direct message over REST and return its id
    pub async fn send_message(&self, from: &TestUser, to: &TestUser, content: &str) -> Uuid {
        let response = self
            .post(
                "/api/message/send",
                Some(&from.token),
                json!({ "receiverId": to.id, "content": content }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().parse().unwrap()
    }
}

/// Value of the session cookie set by a response, if any
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            let pair = v.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            (name.trim() == COOKIE_NAME).then(|| value.trim().to_string())
        })
}

/// Raw `Set-Cookie` header for the session cookie
pub fn session_cookie_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", COOKIE_NAME)))
        .map(str::to_string)
}

/// Generated username that is unique within a run
pub fn unique_username() -> String {
    let base: String = Username().fake();
    let base: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(16)
        .collect();
    format!("{}_{}", base, &Uuid::new_v4().simple().to_string()[..8])
}
