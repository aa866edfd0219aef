//! Test helpers: a scripted fake of the chat-completions upstream and
//! ready-made app state for router tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::jobs::store::InMemoryJobStore;
use crate::llm_client::{LlmClient, RetryPolicy};
use crate::state::AppState;

/// One canned upstream reply.
#[derive(Debug, Clone)]
pub struct Scripted {
    status: u16,
    retry_after: Option<String>,
    body: String,
}

impl Scripted {
    /// 200 with a chat-completions body whose first choice says `content`.
    pub fn answer(content: &str) -> Self {
        Self::raw(
            200,
            &json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
                .to_string(),
        )
    }

    pub fn rate_limited(retry_after: Option<&str>) -> Self {
        Self {
            status: 429,
            retry_after: retry_after.map(str::to_string),
            body: r#"{"error":{"message":"rate limited"}}"#.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::raw(status, r#"{"error":{"message":"upstream failure"}}"#)
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.to_string(),
        }
    }

    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).expect("valid scripted status");
        let mut response = (status, self.body).into_response();
        if let Some(retry_after) = self.retry_after {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from_str(&retry_after).expect("valid Retry-After"),
            );
        }
        response
    }
}

#[derive(Clone)]
struct UpstreamState {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

/// Handle to a running fake upstream.
pub struct FakeUpstream {
    pub url: String,
    state: UpstreamState,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// `(Authorization header, JSON body)` of every request received.
    pub async fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.state.requests.lock().await.clone()
    }
}

async fn respond(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().await.push((auth, body));

    let mut script = state.script.lock().await;
    // The last entry repeats forever.
    let next = if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    };
    next.map(Scripted::into_response)
        .unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Starts a fake chat-completions server on an ephemeral port that replays `script`.
pub async fn spawn_upstream(script: Vec<Scripted>) -> FakeUpstream {
    let state = UpstreamState {
        script: Arc::new(Mutex::new(script.into())),
        hits: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(respond))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        url: format!("http://{addr}/v1/chat/completions"),
        state,
    }
}

/// A URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/chat/completions")
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

/// Empty store and a client pointed at `llm_url` with millisecond backoff.
pub fn test_state(llm_url: &str) -> AppState {
    AppState {
        jobs: Arc::new(InMemoryJobStore::new()),
        llm: LlmClient::new(Some("sk-test".to_string()), llm_url).with_retry_policy(fast_retry()),
    }
}

/// Sends one request through `app` and returns the status with the parsed JSON body
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
