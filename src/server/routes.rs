//! HTTP endpoint handlers
//!
//! - `POST   /api/subscriptions`              subscribe `{userId, topic}`
//! - `DELETE /api/subscriptions`              unsubscribe `{userId, topic}`
//! - `GET    /api/subscriptions/{userId}`     topics for a user
//! - `GET    /api/notifications/stream`       SSE stream, `?userId=...`
//! - `GET    /api/notifications/stats`        registry and publisher counters
//! - `POST   /api/posts`                      save a post, then notify
//! - `GET    /health`                         liveness

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::post::{Post, PostRepository};
use crate::publisher::Publisher;
use crate::registry::NotificationEvent;
use crate::stats::{PublisherSnapshot, RegistryStats};
use crate::subscription::{Subscription, SubscriptionBackend};

use super::error::ApiError;

/// SSE event name for notifications
pub const NOTIFICATION_EVENT: &str = "notification";

/// Shared handler state
pub struct AppState<B, P> {
    pub publisher: Arc<Publisher<B>>,
    pub posts: Arc<P>,
    pub keep_alive_interval: Duration,
}

impl<B, P> Clone for AppState<B, P> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
            posts: Arc::clone(&self.posts),
            keep_alive_interval: self.keep_alive_interval,
        }
    }
}

/// Body of subscribe / unsubscribe
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub user_id: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamParams {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicsResponse {
    pub user_id: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PostCreatedResponse {
    pub message: &'static str,
    pub id: String,
    /// Connections the notification was queued on
    pub notified: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub registry: RegistryStats,
    pub publisher: PublisherSnapshot,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Build the application router
pub fn router<B, P>(state: AppState<B, P>) -> Router
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    Router::new()
        .route(
            "/api/subscriptions",
            post(subscribe::<B, P>).delete(unsubscribe::<B, P>),
        )
        .route("/api/subscriptions/{user_id}", get(list_topics::<B, P>))
        .route("/api/notifications/stream", get(notification_stream::<B, P>))
        .route("/api/notifications/stats", get(stats::<B, P>))
        .route("/api/posts", post(create_post::<B, P>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn subscribe<B, P>(
    State(state): State<AppState<B, P>>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<Json<Subscription>, ApiError>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    let subscription = state
        .publisher
        .store()
        .subscribe(&request.user_id, &request.topic)
        .await?;

    Ok(Json(subscription))
}

async fn unsubscribe<B, P>(
    State(state): State<AppState<B, P>>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<Json<MessageResponse>, ApiError>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    state
        .publisher
        .store()
        .unsubscribe(&request.user_id, &request.topic)
        .await?;

    Ok(Json(MessageResponse {
        message: "Unsubscribed",
    }))
}

async fn list_topics<B, P>(
    State(state): State<AppState<B, P>>,
    Path(user_id): Path<String>,
) -> Result<Json<TopicsResponse>, ApiError>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    let topics = state.publisher.store().list_topics_for_user(&user_id).await?;

    Ok(Json(TopicsResponse { user_id, topics }))
}

async fn notification_stream<B, P>(
    State(state): State<AppState<B, P>>,
    Query(params): Query<StreamParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    let user_id = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".into()))?;

    let events = state.publisher.registry().register(user_id)?;
    let stream = events.map(|event| Ok(sse_event(&event)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(state.keep_alive_interval)))
}

fn sse_event(event: &NotificationEvent) -> Event {
    let base = Event::default()
        .event(NOTIFICATION_EVENT)
        .id(event.id.to_string());

    match event.to_json() {
        Ok(data) => base.data(data),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode notification");
            base.comment("dropped")
        }
    }
}

async fn stats<B, P>(State(state): State<AppState<B, P>>) -> Json<StatsResponse>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    Json(StatsResponse {
        registry: state.publisher.registry().stats(),
        publisher: state.publisher.stats(),
    })
}

async fn create_post<B, P>(
    State(state): State<AppState<B, P>>,
    Json(mut post): Json<Post>,
) -> Result<impl IntoResponse, ApiError>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    post.ensure_id();

    state.posts.save(&post).await.map_err(ApiError::PostSave)?;

    let report = state.publisher.publish(&post).await;

    Ok((
        StatusCode::CREATED,
        Json(PostCreatedResponse {
            message: "Post saved",
            id: post.id,
            notified: report.delivered,
        }),
    ))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_request_camel_case() {
        let request: SubscriptionRequest =
            serde_json::from_str(r#"{"userId":"alice","topic":"Sports"}"#).unwrap();
        assert_eq!(request.user_id, "alice");
        assert_eq!(request.topic, "Sports");
    }

    #[test]
    fn test_topics_response_json() {
        let json = serde_json::to_string(&TopicsResponse {
            user_id: "alice".into(),
            topics: vec!["Sports".into()],
        })
        .unwrap();
        assert_eq!(json, r#"{"userId":"alice","topics":["Sports"]}"#);
    }
}
