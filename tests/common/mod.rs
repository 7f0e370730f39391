#![allow(dead_code)]

use axum::body::Body;
use http_body_util::BodyExt;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use journal::models::User;
use journal::services::CredentialStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = test_pool().await;
        let router = journal::build_app(pool.clone(), false)
            .await
            .expect("Failed to build app");

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Register a user with the shared test password.
    pub async fn create_user(&self, email: &str) -> User {
        CredentialStore::new(self.db.clone())
            .register(email, PASSWORD)
            .await
            .expect("Failed to create test user")
    }

    /// Log in as the given user and return the session cookie string.
    pub async fn login(&self, email: &str) -> String {
        let resp = self
            .post_form("/login", &login_body(email, PASSWORD), None)
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        session_cookie(&resp).expect("Login should set a session cookie")
    }

    /// Register and log in a fresh user, returning (user, cookie).
    pub async fn signed_in(&self, email: &str) -> (User, String) {
        let user = self.create_user(email).await;
        let cookie = self.login(email).await;
        (user, cookie)
    }

    /// Submit the new entry form.
    pub async fn create_entry(&self, cookie: &str, title: &str, date: &str, tags: &str) -> Response {
        self.post_form("/new-entry", &entry_body(title, date, "45", tags), Some(cookie))
            .await
    }

    pub async fn entry_id(&self, slug: &str) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT id FROM entries WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.db)
            .await
            .expect("entry should exist");
        row.0
    }

    /// Tags stored for a user, as (tag, post_url) pairs in insertion order.
    pub async fn tags(&self, user_id: &str) -> Vec<(String, String)> {
        sqlx::query_as("SELECT tag, post_url FROM tags WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .unwrap()
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST form request with an optional session cookie.
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }
}

/// Minimal form encoding for test values.
pub fn encode(value: &str) -> String {
    let mut out = String::new();
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

pub fn login_body(email: &str, password: &str) -> String {
    format!("email={}&password={}", encode(email), encode(password))
}

pub fn entry_body(title: &str, date: &str, time_spent: &str, tags: &str) -> String {
    format!(
        "title={}&date={}&time_spent={}&what_i_learned=Something+new&resources_to_remember=The+docs&tags={}",
        encode(title),
        encode(date),
        encode(time_spent),
        encode(tags)
    )
}

pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get("set-cookie")?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}
