//! HTTP intake surface.
//!
//! Thin `axum` routes: `queueSend` inserts + signals the drain scheduler,
//! `unsentMessages` reads terminal errors, `dayReport` renders the
//! `askama` template. Every route sits behind a forward-secret middleware
//! layer; validation/store failures map to `500 {"err": ...}` via ordinary
//! `Result` returns — handlers never panic.

pub mod report;
pub mod validate;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, extract::Request};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::GatewayError;
use crate::scheduler::FlushSignal;
use crate::store::{Message, MessageStore};

use report::{parse_report_date, render_day_report};
use validate::validate_queue_send;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(HttpError { err: self.to_string() })).into_response()
    }
}

#[derive(Serialize, Default)]
struct HttpError {
    err: String,
}

#[derive(Deserialize)]
struct QueueSendRequest {
    from: String,
    phone: String,
    text: String,
}

#[derive(Serialize)]
struct UnsentMessagesResponse {
    err: String,
    messages: Vec<Message>,
}

/// Shared application state handed to every handler.
pub struct AppState<S: MessageStore> {
    pub store: Arc<S>,
    pub flush: FlushSignal,
}

/// Builds the gateway's router, mounted under `project_path` and guarded by
/// the `X-Forward-Secret` middleware.
pub fn router<S: MessageStore + 'static>(
    state: Arc<AppState<S>>,
    project_path: &str,
    forward_secret: String,
) -> Router {
    let routes = Router::new()
        .route("/queueSend", post(queue_send::<S>))
        .route("/unsentMessages", get(unsent_messages::<S>))
        .route("/dayReport", get(day_report::<S>))
        .with_state(state)
        .layer(middleware::from_fn(move |headers: HeaderMap, req: Request, next: Next| {
            let forward_secret = forward_secret.clone();
            async move { forward_secret_guard(forward_secret, headers, req, next).await }
        }))
        .layer(TraceLayer::new_for_http());

    if project_path.is_empty() {
        routes
    } else {
        Router::new().nest(project_path, routes)
    }
}

/// Rejects any request whose `X-Forward-Secret` header doesn't match the
/// configured constant with a bare `403`, before any handler or error type
/// is involved.
async fn forward_secret_guard(
    forward_secret: String,
    headers: HeaderMap,
    req: Request,
    next: Next,
) -> Response {
    let provided = headers
        .get("X-Forward-Secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided != forward_secret {
        return StatusCode::FORBIDDEN.into_response();
    }
    next.run(req).await
}

async fn queue_send<S: MessageStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<QueueSendRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    validate_queue_send(&req.phone, &req.from, &req.text)?;
    state.store.insert(&req.from, &req.phone, &req.text).await?;
    state.flush.signal();
    Ok(Json(HttpError::default()))
}

async fn unsent_messages<S: MessageStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, GatewayError> {
    let messages = state.store.select_terminal_errors().await?;
    Ok(Json(UnsentMessagesResponse {
        err: String::new(),
        messages,
    }))
}

#[derive(Deserialize)]
struct DayReportQuery {
    date: Option<String>,
}

async fn day_report<S: MessageStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<DayReportQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let day = parse_report_date(query.date.as_deref())?;
    let body = render_day_report(state.store.as_ref(), day).await?;
    Ok((
        StatusCode::OK,
        [("content-type", "text/plain;charset=utf-8")],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMessageStore;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = Arc::new(InMemoryMessageStore::new());
        let flush = test_flush_signal(store.clone());
        let state = Arc::new(AppState { store, flush });
        router(state, "", "s3cret".to_string())
    }

    fn test_flush_signal(store: Arc<InMemoryMessageStore>) -> FlushSignal {
        let pool = Arc::new(crate::pool::SessionPool::new(vec![]));
        let scheduler = Arc::new(crate::scheduler::DrainScheduler::new(store, pool, true));
        scheduler.spawn()
    }

    #[tokio::test]
    async fn wrong_secret_is_forbidden() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/unsentMessages")
                    .header("X-Forward-Secret", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_secret_is_forbidden() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/unsentMessages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn queue_send_rejects_invalid_phone() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/queueSend")
                    .header("X-Forward-Secret", "s3cret")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"from":"ACME","phone":"12345","text":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn queue_send_accepts_valid_request() {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/queueSend")
                    .header("X-Forward-Secret", "s3cret")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"from":"ACME","phone":"+71234567890","text":"hi"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
