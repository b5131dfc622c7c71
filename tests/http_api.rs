use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tower::ServiceExt;

use blog_notify::post::{MemoryPostRepository, Post, PostRepository};
use blog_notify::registry::RegistryConfig;
use blog_notify::server::{NotifyServer, ServerConfig};
use blog_notify::subscription::{MemoryBackend, StoreError};

type MemoryServer = NotifyServer<MemoryBackend, MemoryPostRepository>;

fn server_with(registry: RegistryConfig) -> MemoryServer {
    let config = ServerConfig::default()
        .keep_alive_interval(Duration::from_secs(60))
        .registry(registry);
    NotifyServer::new(config, MemoryBackend::new(), MemoryPostRepository::new())
}

fn server() -> MemoryServer {
    server_with(RegistryConfig::default())
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn subscribe(app: &Router, user_id: &str, topic: &str) {
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/api/subscriptions",
            json!({ "userId": user_id, "topic": topic }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// Read SSE frames until one carries data, and return that data as JSON
async fn next_notification(body: &mut axum::body::BodyDataStream) -> Value {
    let mut buffer = String::new();
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        if let Some(end) = buffer.find("\n\n") {
            let frame = &buffer[..end];
            assert!(frame.contains("event: notification"), "frame: {frame}");
            let data = frame
                .lines()
                .find_map(|line| line.strip_prefix("data: "))
                .expect("frame without data");
            return serde_json::from_str(data).unwrap();
        }
    }
}

#[tokio::test]
async fn subscribe_and_list_topics() {
    let server = server();
    let app = server.router();

    subscribe(&app, "alice", "Sports").await;
    subscribe(&app, "alice", "Sports").await;
    subscribe(&app, "alice", "Health").await;

    let (status, body) = send(&app, get("/api/subscriptions/alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "userId": "alice", "topics": ["Health", "Sports"] }));

    let (status, body) = send(&app, get("/api/subscriptions/nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topics"], json!([]));
}

#[tokio::test]
async fn unsubscribe_existing_and_missing() {
    let server = server();
    let app = server.router();

    subscribe(&app, "alice", "Sports").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::DELETE,
            "/api/subscriptions",
            json!({ "userId": "alice", "topic": "Sports" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(
            Method::DELETE,
            "/api/subscriptions",
            json!({ "userId": "alice", "topic": "Sports" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SUBSCRIPTION_NOT_FOUND");

    let (_, body) = send(&app, get("/api/subscriptions/alice")).await;
    assert_eq!(body["topics"], json!([]));
}

#[tokio::test]
async fn blank_topic_rejected() {
    let server = server();
    let app = server.router();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/subscriptions",
            json!({ "userId": "alice", "topic": "  " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn store_unavailable_is_retryable_failure() {
    let server = server();
    let app = server.router();
    server.publisher().store().backend().set_available(false);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/subscriptions",
            json!({ "userId": "alice", "topic": "Sports" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn stream_requires_user_id() {
    let server = server();
    let app = server.router();

    let (status, body) = send(&app, get("/api/notifications/stream")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = send(&app, get("/api/notifications/stream?userId=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stream_rejected_at_capacity() {
    let server = server_with(RegistryConfig::default().max_connections(1));
    let app = server.router();

    let first = app
        .clone()
        .oneshot(get("/api/notifications/stream?userId=alice"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let (status, body) = send(&app, get("/api/notifications/stream?userId=bob")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");

    drop(first);
    assert_eq!(server.registry().total_connections(), 0);
}

#[tokio::test]
async fn post_pushes_to_subscribed_stream_only() {
    let server = server();
    let app = server.router();

    subscribe(&app, "alice", "Sports").await;

    let alice = app
        .clone()
        .oneshot(get("/api/notifications/stream?userId=alice"))
        .await
        .unwrap();
    assert_eq!(alice.status(), StatusCode::OK);
    assert_eq!(
        alice.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let mut alice = alice.into_body().into_data_stream();

    let bob = app
        .clone()
        .oneshot(get("/api/notifications/stream?userId=bob"))
        .await
        .unwrap();
    let _bob = bob.into_body();

    assert_eq!(server.registry().connection_count("alice"), 1);
    assert_eq!(server.registry().connection_count("bob"), 1);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/posts",
            json!({
                "id": "1712345678901",
                "title": "Big Game",
                "description": "Recap",
                "category": "Sports",
                "author": "carol",
                "comments": [],
                "date": "2024-04-05T12:00:00.000Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Post saved");
    assert_eq!(body["id"], "1712345678901");
    assert_eq!(body["notified"], 1);

    let event = next_notification(&mut alice).await;
    assert_eq!(event["category"], "Sports");
    assert_eq!(event["title"], "Big Game");
    assert_eq!(event["message"], "New post in \"Sports\": \"Big Game\"");

    let saved = server.publisher().stats();
    assert_eq!(saved.posts_published, 1);
    assert_eq!(saved.events_delivered, 1);
}

#[tokio::test]
async fn closing_stream_deregisters() {
    let server = server();
    let app = server.router();

    let response = app
        .clone()
        .oneshot(get("/api/notifications/stream?userId=alice"))
        .await
        .unwrap();
    assert_eq!(server.registry().connection_count("alice"), 1);

    drop(response);
    assert_eq!(server.registry().connection_count("alice"), 0);

    let (_, body) = send(&app, get("/api/notifications/stats")).await;
    assert_eq!(body["registry"], json!({ "users": 0, "connections": 0 }));
}

#[tokio::test]
async fn post_succeeds_when_subscriber_lookup_fails() {
    let server = server();
    let app = server.router();
    subscribe(&app, "alice", "Sports").await;
    server.publisher().store().backend().set_available(false);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/posts",
            json!({ "title": "Big Game", "category": "Sports" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["notified"], 0);
    assert!(body["id"].as_str().unwrap().parse::<u64>().is_ok());
    assert_eq!(server.publisher().stats().store_failures, 1);
}

struct FailingPosts;

impl PostRepository for FailingPosts {
    async fn save(&self, _post: &Post) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("index down".into()))
    }
}

#[tokio::test]
async fn failed_post_save_notifies_nobody() {
    let server = NotifyServer::new(ServerConfig::default(), MemoryBackend::new(), FailingPosts);
    let app = server.router();
    subscribe(&app, "alice", "Sports").await;
    let mut alice = server.registry().register("alice").unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/posts",
            json!({ "title": "Big Game", "category": "Sports" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to save post");
    assert!(alice.try_recv().is_none());
    assert_eq!(server.publisher().stats().posts_published, 0);
}

#[tokio::test]
async fn health() {
    let server = server();
    let (status, body) = send(&server.router(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
