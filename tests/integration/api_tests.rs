//! API integration tests

use std::collections::HashSet;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshelf_server::{api::create_router, AppState};

fn app() -> Router {
    create_router(AppState::new())
}

/// Send a request and decode the JSON body
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn create(app: &Router, body: Value) -> String {
    let (status, body) = send(app, Method::POST, "/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["bookId"]
        .as_str()
        .expect("No book id in response")
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_book() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({
            "name": "Buku A",
            "year": 2010,
            "author": "John Doe",
            "summary": "Lorem ipsum",
            "publisher": "Dicoding",
            "pageCount": 100,
            "readPage": 25,
            "reading": false
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book added successfully");
    assert_eq!(body["data"]["bookId"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_create_without_name() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "pageCount": 100, "readPage": 25 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Failed to add book. Please provide the book name");
}

#[tokio::test]
async fn test_create_read_page_over_page_count() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "name": "Too far", "pageCount": 80, "readPage": 90 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Failed to add book. readPage cannot be greater than pageCount"
    );

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"], json!([]));
}

#[tokio::test]
async fn test_create_rejects_malformed_payload() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "name": "Negative", "pageCount": -1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_get_book_round_trip() {
    let app = app();
    let id = create(
        &app,
        json!({
            "name": "Round Trip",
            "year": 1999,
            "author": "Jane",
            "publisher": "Press",
            "pageCount": 300,
            "readPage": 300,
            "reading": true
        }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let book = &body["data"]["book"];
    assert_eq!(book["id"], id.as_str());
    assert_eq!(book["name"], "Round Trip");
    assert_eq!(book["year"], 1999);
    assert_eq!(book["author"], "Jane");
    assert_eq!(book["summary"], Value::Null);
    assert_eq!(book["publisher"], "Press");
    assert_eq!(book["pageCount"], 300);
    assert_eq!(book["readPage"], 300);
    assert_eq!(book["finished"], true);
    assert_eq!(book["reading"], true);
    assert!(book["insertedAt"].is_string());
    assert_eq!(book["insertedAt"], book["updatedAt"]);
}

#[tokio::test]
async fn test_unknown_id_returns_404() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/books/xxxxxxxxxxxxxxxx", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Book not found");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/books/xxxxxxxxxxxxxxxx",
        Some(json!({ "name": "Nope", "pageCount": 1, "readPage": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to update book. Id not found");

    let (status, body) = send(&app, Method::DELETE, "/books/xxxxxxxxxxxxxxxx", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Failed to delete book. Id not found");
}

#[tokio::test]
async fn test_update_book() {
    let app = app();
    let id = create(
        &app,
        json!({ "name": "Before", "pageCount": 100, "readPage": 10, "reading": true }),
    )
    .await;
    let (_, before) = send(&app, Method::GET, &format!("/books/{}", id), None).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(json!({
            "name": "After",
            "publisher": "New Press",
            "pageCount": 120,
            "readPage": 120,
            "reading": false
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["name"], "After");
    assert_eq!(body["data"]["finished"], true);
    assert_eq!(body["data"]["insertedAt"], before["data"]["book"]["insertedAt"]);

    let (_, after) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(after["data"]["book"], body["data"]);
}

#[tokio::test]
async fn test_update_validation() {
    let app = app();
    let id = create(&app, json!({ "name": "Stay", "pageCount": 10, "readPage": 5 })).await;
    let uri = format!("/books/{}", id);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "pageCount": 10 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to update book. Please provide the book name");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "name": "Stay", "pageCount": 10, "readPage": 11 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Failed to update book. readPage cannot be greater than pageCount"
    );

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["book"]["readPage"], 5);
}

#[tokio::test]
async fn test_list_filters() {
    let app = app();
    create(
        &app,
        json!({ "name": "A", "publisher": "P1", "pageCount": 100, "readPage": 100, "reading": false }),
    )
    .await;
    create(
        &app,
        json!({ "name": "B", "publisher": "P2", "pageCount": 100, "readPage": 50, "reading": true }),
    )
    .await;

    let names = |body: &Value| -> Vec<String> {
        body["data"]["books"]
            .as_array()
            .expect("books is not an array")
            .iter()
            .map(|book| book["name"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(names(&body), vec!["A", "B"]);

    let summary = &body["data"]["books"][0];
    assert_eq!(summary["publisher"], "P1");
    assert!(summary["id"].is_string());
    assert!(summary.get("pageCount").is_none());

    let (_, body) = send(&app, Method::GET, "/books?reading=1", None).await;
    assert_eq!(names(&body), vec!["B"]);

    let (_, body) = send(&app, Method::GET, "/books?finished=0", None).await;
    assert_eq!(names(&body), vec!["B"]);

    // reading is checked before finished
    let (_, body) = send(&app, Method::GET, "/books?reading=0&finished=0", None).await;
    assert_eq!(names(&body), vec!["A"]);

    // name is checked before everything else
    let (_, body) = send(&app, Method::GET, "/books?name=B&finished=1", None).await;
    assert_eq!(names(&body), vec!["B"]);

    // unrecognised flag values fall through to the next filter
    let (_, body) = send(&app, Method::GET, "/books?reading=yes&finished=1", None).await;
    assert_eq!(names(&body), vec!["A"]);
}

#[tokio::test]
async fn test_finished_filter_and_delete_scenario() {
    let app = app();
    let a = create(&app, json!({ "name": "A", "pageCount": 100, "readPage": 100 })).await;
    let b = create(&app, json!({ "name": "B", "pageCount": 100, "readPage": 50 })).await;
    assert_ne!(a, b);

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", a), None).await;
    assert_eq!(body["data"]["book"]["finished"], true);
    let (_, body) = send(&app, Method::GET, &format!("/books/{}", b), None).await;
    assert_eq!(body["data"]["book"]["finished"], false);

    let (status, body) = send(&app, Method::GET, "/books?finished=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["id"], a.as_str());
    assert_eq!(books[0]["name"], "A");

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Book deleted successfully");
    assert!(body.get("data").is_none());

    let (status, _) = send(&app, Method::GET, &format!("/books/{}", a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["books"][0]["id"], b.as_str());
}

#[tokio::test]
async fn test_list_with_repeated_keys() {
    let app = app();
    create(&app, json!({ "name": "a", "pageCount": 10, "readPage": 10 })).await;
    create(&app, json!({ "name": "b", "pageCount": 10, "readPage": 1, "reading": true })).await;

    let (status, body) = send(&app, Method::GET, "/books?name=a&name=b", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["books"], json!([]));

    // repeated flags select nothing, finished still applies
    let (status, body) =
        send(&app, Method::GET, "/books?reading=1&reading=0&finished=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["name"], "a");
}

#[tokio::test]
async fn test_fractional_year() {
    let app = app();
    let id = create(&app, json!({ "name": "Odd year", "year": 2010.5 })).await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["book"]["year"], 2010.5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_and_deletes() {
    const BOOKS: usize = 64;
    let app = app();

    let creates: Vec<_> = (0..BOOKS)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                create(
                    &app,
                    json!({ "name": format!("Book {}", i), "pageCount": 10, "readPage": i % 11 }),
                )
                .await
            })
        })
        .collect();

    let mut ids = Vec::with_capacity(BOOKS);
    for handle in creates {
        ids.push(handle.await.expect("create task panicked"));
    }

    let distinct: HashSet<&String> = ids.iter().collect();
    assert_eq!(distinct.len(), BOOKS);

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), BOOKS);

    let deletes: Vec<_> = ids
        .iter()
        .step_by(2)
        .cloned()
        .map(|id| {
            let app = app.clone();
            tokio::spawn(async move {
                send(&app, Method::DELETE, &format!("/books/{}", id), None).await.0
            })
        })
        .collect();

    for handle in deletes {
        assert_eq!(handle.await.expect("delete task panicked"), StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    let remaining: Vec<&str> = body["data"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["id"].as_str().unwrap())
        .collect();
    let kept: Vec<&str> = ids.iter().skip(1).step_by(2).map(String::as_str).collect();
    assert_eq!(remaining.len(), BOOKS / 2);
    for id in kept {
        assert!(remaining.contains(&id));
    }
}
