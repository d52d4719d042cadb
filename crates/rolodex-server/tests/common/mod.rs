#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use rolodex_db::{init_schema, Database, DbSettings, IN_MEMORY_PATH};
use rolodex_server::{app, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a fresh database. The temp dir lives as long as this value.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _dir: Option<TempDir>,
}

/// Builds the app over a file database in a temp dir.
pub fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolodex.db");
    let db = Database::open(path.to_str().unwrap(), DbSettings::default()).unwrap();
    init_schema(&db.connect().unwrap()).unwrap();
    TestApp {
        router: app(AppState { db: db.clone() }),
        db,
        _dir: Some(dir),
    }
}

/// Builds the app over an in-memory database.
pub fn setup_memory_app() -> TestApp {
    let db = Database::open(IN_MEMORY_PATH, DbSettings::default()).unwrap();
    init_schema(&db.connect().unwrap()).unwrap();
    TestApp {
        router: app(AppState { db: db.clone() }),
        db,
        _dir: None,
    }
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Creates a customer through the API and returns its id.
    pub async fn create_customer(&self, body: Value) -> i64 {
        let (status, json) = self.send("POST", "/api/customers", Some(body)).await;
        assert_eq!(status, StatusCode::OK, "create failed: {json}");
        json["customer_id"].as_i64().unwrap()
    }
}
