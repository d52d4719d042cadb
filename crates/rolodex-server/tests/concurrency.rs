mod common;

use axum::http::StatusCode;
use common::{setup_app, setup_memory_app, TestApp};
use serde_json::json;
use std::sync::Arc;

const WRITERS: usize = 16;

async fn race_same_phone(app: TestApp) {
    let app = Arc::new(app);
    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                app.send(
                    "POST",
                    "/api/customers",
                    Some(json!({
                        "first_name": format!("Racer{n}"),
                        "last_name": "Same",
                        "phone_number": "555-7777"
                    })),
                )
                .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (status, json) = handle.await.unwrap();
        match status {
            StatusCode::OK => created += 1,
            StatusCode::BAD_REQUEST => assert_eq!(json["error"], "Phone number already exists"),
            other => panic!("unexpected status {other}: {json}"),
        }
    }
    assert_eq!(created, 1, "exactly one create may win the phone number");

    let (_, json) = app.send("GET", "/api/customers?limit=100", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

async fn mixed_writes(app: TestApp) {
    let app = Arc::new(app);
    let handles: Vec<_> = (0..WRITERS * 4)
        .map(|n| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                let (status, json) = app
                    .send(
                        "POST",
                        "/api/customers",
                        Some(json!({
                            "first_name": "Busy",
                            "last_name": "Writer",
                            "phone_number": format!("555-8{n:03}"),
                            "address_details": "1 Lane",
                            "city": "Pune",
                            "state": "MH",
                            "pin_code": "411001"
                        })),
                    )
                    .await;
                assert_eq!(status, StatusCode::OK, "create failed: {json}");
                let id = json["customer_id"].as_i64().unwrap();
                if n % 2 == 0 {
                    let (status, json) = app
                        .send("DELETE", &format!("/api/customers/{id}"), None)
                        .await;
                    assert_eq!(status, StatusCode::OK, "delete failed: {json}");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let (_, json) = app.send("GET", "/api/customers?limit=100", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), WRITERS * 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_duplicate_creates_on_file_database() {
    race_same_phone(setup_app()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_duplicate_creates_on_memory_database() {
    race_same_phone(setup_memory_app()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_writes_on_file_database() {
    mixed_writes(setup_app()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_writes_on_memory_database() {
    mixed_writes(setup_memory_app()).await;
}
