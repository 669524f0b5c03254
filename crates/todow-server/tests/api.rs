//! Integration tests for the HTTP API.
//!
//! Requests go through the full router (auth layer, routing, handlers) via
//! `tower::ServiceExt::oneshot`, backed by an in-memory SQLite store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use todow_core::{
    CollectionStore, Credentials, Item, ItemId, SqliteCollectionStore, StoreError,
};
use todow_server::{create_router, AppState};

/// `todow:todow`
const GOOD_AUTH: &str = "Basic dG9kb3c6dG9kb3c=";
/// `todow:wrong`
const BAD_AUTH: &str = "Basic dG9kb3c6d3Jvbmc=";

fn app() -> (Router, Arc<AppState>) {
    let store = SqliteCollectionStore::open_in_memory().unwrap();
    app_with_store(Arc::new(store))
}

fn app_with_store(store: Arc<dyn CollectionStore>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(store, Credentials::default()));
    (create_router(Arc::clone(&state)), state)
}

fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, GOOD_AUTH)
}

fn json_add(body: &str) -> Request<Body> {
    request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(
            r#"{{"Body": "{}", "Created": "2016-03-01T12:30:00Z"}}"#,
            body
        )))
        .unwrap()
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    request(method, uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn list(app: &Router) -> Vec<Item> {
    let response = send(app, empty(Method::GET, "/api/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_str(&body_text(response).await).unwrap()
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_every_route_requires_credentials() {
    let (app, state) = app();

    let routes = [
        (Method::GET, "/"),
        (Method::GET, "/api/"),
        (Method::POST, "/api/"),
        (Method::DELETE, "/api/1"),
        (Method::PATCH, "/api/1"),
        (Method::PUT, "/api/"),
        (Method::GET, "/no/such/page"),
    ];

    for (method, uri) in routes {
        for auth in [None, Some(BAD_AUTH), Some("Bearer token")] {
            let mut builder = Request::builder()
                .method(method.clone())
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(auth) = auth {
                builder = builder.header(header::AUTHORIZATION, auth);
            }
            let req = builder
                .body(Body::from(r#"{"Body": "sneaky"}"#))
                .unwrap();

            let response = send(&app, req).await;
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{} {} with {:?}",
                method,
                uri,
                auth
            );
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Basic");
        }
    }

    assert!(state.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_custom_credentials() {
    let store = Arc::new(SqliteCollectionStore::open_in_memory().unwrap());
    let state = Arc::new(AppState::new(store, Credentials::new("me", "pw")));
    let app = create_router(state);

    let response = send(&app, empty(Method::GET, "/")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/")
        .header(header::AUTHORIZATION, "Basic bWU6cHc=")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.status(), StatusCode::OK);
}

// =============================================================================
// GET /api/
// =============================================================================

#[tokio::test]
async fn test_list_before_first_add() {
    let (app, _) = app();

    let response = send(&app, empty(Method::GET, "/api/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "no items yet\n");
}

#[tokio::test]
async fn test_list_returns_stored_json() {
    let (app, _) = app();
    send(&app, json_add("buy milk")).await;

    let response = send(&app, empty(Method::GET, "/api/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(
        body_text(response).await,
        r#"[{"ID":1,"Body":"buy milk","Created":"2016-03-01T12:30:00Z","Done":false}]"#
    );
}

// =============================================================================
// POST /api/
// =============================================================================

#[tokio::test]
async fn test_json_add_assigns_ids() {
    let (app, _) = app();

    let response = send(&app, json_add("buy milk")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_text(response).await, "Added item #1\n");

    let response = send(&app, json_add("walk dog")).await;
    assert_eq!(body_text(response).await, "Added item #2\n");

    let bodies: Vec<String> = list(&app).await.into_iter().map(|i| i.body).collect();
    assert_eq!(bodies, vec!["buy milk", "walk dog"]);
}

#[tokio::test]
async fn test_json_add_with_charset_and_without_created() {
    let (app, _) = app();

    let req = request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"ID": 40, "Body": "no timestamp", "Done": true}"#))
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let items = list(&app).await;
    assert_eq!(items[0].id, 1);
    assert!(!items[0].done);
    assert!(items[0].created.timestamp() > 0);
}

#[tokio::test]
async fn test_form_add_redirects_to_root() {
    let (app, _) = app();

    let req = request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("body=water+the+plants"))
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let items = list(&app).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].body, "water the plants");
    assert!(items[0].created.timestamp() > 0);
}

#[tokio::test]
async fn test_add_matches_content_type_case_insensitively() {
    let (app, _) = app();

    let req = request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "Application/X-WWW-Form-Urlencoded")
        .body(Body::from("body=x"))
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let req = request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "APPLICATION/JSON; Charset=UTF-8")
        .body(Body::from(r#"{"Body": "y"}"#))
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_text(response).await, "Added item #2\n");

    let bodies: Vec<String> = list(&app).await.into_iter().map(|i| i.body).collect();
    assert_eq!(bodies, vec!["x", "y"]);
}

#[tokio::test]
async fn test_add_rejects_other_content_types() {
    let (app, state) = app();

    let req = request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("buy milk"))
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "content type not supported\n");

    let req = empty(Method::POST, "/api/");
    assert_eq!(send(&app, req).await.status(), StatusCode::BAD_REQUEST);

    assert!(state.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_add_rejects_malformed_json() {
    let (app, state) = app();

    let req = request(Method::POST, "/api/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"Body": "#))
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .starts_with("unable to decode todo item"));

    assert!(state.store.load().unwrap().is_none());
}

// =============================================================================
// DELETE / PATCH /api/{id}
// =============================================================================

#[tokio::test]
async fn test_remove_item() {
    let (app, _) = app();
    for body in ["a", "b", "c"] {
        send(&app, json_add(body)).await;
    }

    let response = send(&app, empty(Method::DELETE, "/api/2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Removed item #2\n");

    let ids: Vec<ItemId> = list(&app).await.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let response = send(&app, empty(Method::DELETE, "/api/2")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_item_twice() {
    let (app, _) = app();
    send(&app, json_add("a")).await;
    send(&app, json_add("b")).await;

    for _ in 0..2 {
        let response = send(&app, empty(Method::PATCH, "/api/1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Completed item #1\n");
    }

    let done: Vec<bool> = list(&app).await.iter().map(|i| i.done).collect();
    assert_eq!(done, vec![true, false]);
}

#[tokio::test]
async fn test_mutations_on_empty_store_are_not_found() {
    let (app, state) = app();

    assert_eq!(
        send(&app, empty(Method::DELETE, "/api/1")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&app, empty(Method::PATCH, "/api/1")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert!(state.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_non_numeric_ids_are_not_routed() {
    let (app, _) = app();
    send(&app, json_add("a")).await;

    for uri in ["/api/abc", "/api/1x", "/api/-1", "/api/%FF", "/api/%C3%28"] {
        for method in [Method::DELETE, Method::PATCH] {
            let response = send(&app, empty(method.clone(), uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
        }
    }
    assert_eq!(
        send(&app, empty(Method::DELETE, "/api/")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&app, empty(Method::PUT, "/api/1")).await.status(),
        StatusCode::NOT_FOUND
    );

    assert_eq!(list(&app).await.len(), 1);
}

#[tokio::test]
async fn test_example_scenario() {
    let (app, _) = app();

    assert_eq!(body_text(send(&app, json_add("buy milk")).await).await, "Added item #1\n");
    assert_eq!(body_text(send(&app, json_add("walk dog")).await).await, "Added item #2\n");
    send(&app, empty(Method::PATCH, "/api/1")).await;

    let items = list(&app).await;
    assert_eq!(items.len(), 2);
    assert!(items[0].done && items[0].body == "buy milk");
    assert!(!items[1].done && items[1].body == "walk dog");

    send(&app, empty(Method::DELETE, "/api/1")).await;
    let items = list(&app).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 2);

    assert_eq!(
        send(&app, empty(Method::DELETE, "/api/1")).await.status(),
        StatusCode::NOT_FOUND
    );
}

// =============================================================================
// GET /
// =============================================================================

#[tokio::test]
async fn test_index_page() {
    let (app, _) = app();

    let response = send(&app, empty(Method::GET, "/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<form"));
    assert!(!html.contains(r#"class="item""#));

    send(&app, json_add("<script>alert(1)</script>")).await;
    let html = body_text(send(&app, empty(Method::GET, "/")).await).await;
    assert!(html.contains(r#"data-id="1""#));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[tokio::test]
async fn test_unmatched_paths_are_not_found() {
    let (app, _) = app();
    send(&app, json_add("a")).await;

    for uri in ["/anything", "/index.html", "/api", "/api/1/extra"] {
        let response = send(&app, empty(Method::GET, uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body_text(response).await, "404 page not found\n");
    }
    assert_eq!(
        send(&app, empty(Method::POST, "/")).await.status(),
        StatusCode::NOT_FOUND
    );
}

// =============================================================================
// Store failures
// =============================================================================

/// A store whose every operation fails the same way.
struct FailingStore(fn() -> StoreError);

impl CollectionStore for FailingStore {
    fn load(&self) -> Result<Option<Vec<Item>>, StoreError> {
        Err((self.0)())
    }

    fn add(&self, _item: &mut Item) -> Result<ItemId, StoreError> {
        Err((self.0)())
    }

    fn remove(&self, _id: ItemId) -> Result<(), StoreError> {
        Err((self.0)())
    }

    fn complete(&self, _id: ItemId) -> Result<(), StoreError> {
        Err((self.0)())
    }

    fn all_items(&self) -> Result<Vec<u8>, StoreError> {
        Err((self.0)())
    }
}

#[tokio::test]
async fn test_corrupt_collection_is_server_error() {
    let (app, _) = app_with_store(Arc::new(FailingStore(|| {
        StoreError::Corrupt("expected value at line 1 column 1".into())
    })));

    let response = send(&app, empty(Method::GET, "/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response)
        .await
        .starts_with("collection seems corrupt"));

    assert_eq!(
        send(&app, json_add("x")).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        send(&app, empty(Method::PATCH, "/api/1")).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_storage_failure_text_is_returned() {
    let (app, _) = app_with_store(Arc::new(FailingStore(|| {
        StoreError::Storage("disk I/O error".into())
    })));

    let response = send(&app, empty(Method::DELETE, "/api/1")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "storage error: disk I/O error\n");
}
