//! Integration tests for search, the merged feed, and health.

mod helpers;

use http::StatusCode;
use serde_json::json;

use letras_database::StoreOp;

#[tokio::test]
async fn test_search_across_collections() {
    let app = helpers::TestApp::new();
    app.create(
        "books",
        json!({ "title": "Cien años de soledad", "author": "García Márquez" }),
    )
    .await;
    app.create("movies", json!({ "title": "Soledad en la ciudad" }))
        .await;
    app.create("books", json!({ "title": "El túnel", "author": "Sabato" }))
        .await;

    let response = app.request("GET", "/api/search?q=SOLEDAD", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalCount"], 2);
    assert_eq!(response.body["results"]["books"].as_array().map(Vec::len), Some(1));
    assert_eq!(response.body["results"]["movies"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_search_one_collection() {
    let app = helpers::TestApp::new();
    app.create("books", json!({ "title": "Rayuela", "author": "Cortázar" }))
        .await;
    app.create("movies", json!({ "title": "Rayuela, la película" }))
        .await;

    let response = app
        .request("GET", "/api/search?q=rayuela&collection=books", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalCount"], 1);
    assert!(response.body["results"].get("movies").is_none());
}

#[tokio::test]
async fn test_search_rejects_bad_input() {
    let app = helpers::TestApp::new();
    let blank = app.request("GET", "/api/search?q=%20%20", None).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let missing = app.request("GET", "/api/search", None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let unsearchable = app
        .request("GET", "/api/search?q=x&collection=prestamos", None)
        .await;
    assert_eq!(unsearchable.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feed_merges_posts_and_events_newest_first() {
    let app = helpers::TestApp::new();
    app.create(
        "posts",
        json!({ "title": "Post viejo", "content": "...", "createdAt": "2024-01-01T00:00:00Z" }),
    )
    .await;
    app.create(
        "events",
        json!({ "title": "Evento", "date": "2024-07-01", "createdAt": "2024-03-01T00:00:00Z" }),
    )
    .await;
    app.create(
        "posts",
        json!({ "title": "Post nuevo", "content": "...", "createdAt": "2024-06-01T00:00:00Z" }),
    )
    .await;
    app.create("books", json!({ "title": "No va al feed", "author": "X" }))
        .await;

    let response = app.request("GET", "/api/feed?limit=2", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalCount"], 3);
    assert_eq!(response.body["totalPages"], 2);
    assert_eq!(response.titles("feed"), vec!["Post nuevo", "Evento"]);
    assert_eq!(response.body["feed"][0]["type"], "post");
    assert_eq!(response.body["feed"][1]["type"], "event");

    let second = app.request("GET", "/api/feed?page=2&limit=2", None).await;
    assert_eq!(second.titles("feed"), vec!["Post viejo"]);
}

#[tokio::test]
async fn test_feed_does_not_scan_whole_collections() {
    let app = helpers::TestApp::new();
    for (i, title) in ["Uno", "Dos", "Tres"].iter().enumerate() {
        app.create(
            "posts",
            json!({ "title": title, "content": "...", "createdAt": format!("2024-0{}-01T00:00:00Z", i + 1) }),
        )
        .await;
    }
    app.create(
        "events",
        json!({ "title": "Lectura", "date": "2024-08-01", "createdAt": "2024-01-15T00:00:00Z" }),
    )
    .await;
    app.store.fail_always(StoreOp::GetMany);

    let response = app.request("GET", "/api/feed?page=2&limit=2", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalCount"], 4);
    assert_eq!(response.titles("feed"), vec!["Lectura", "Uno"]);

    let beyond = app.request("GET", "/api/feed?page=5&limit=2", None).await;
    assert_eq!(beyond.status, StatusCode::OK);
    assert_eq!(beyond.body["feed"], json!([]));
    assert_eq!(beyond.body["totalPages"], 2);
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["health"], "ok");
    assert_eq!(response.body["store"], "up");
}
