//! Scriptable upstream served over real HTTP for tests

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<String, (StatusCode, String)>>,
    received: Mutex<Vec<(String, Value)>>,
    delay: Mutex<Option<Duration>>,
}

pub(crate) struct StubUpstream {
    pub base_url: String,
    state: Arc<StubState>,
    task: JoinHandle<()>,
}

impl StubUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(respond).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    /// Answer `path` with a raw status and body
    pub fn reply(&self, path: &str, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).unwrap();
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    pub fn reply_json(&self, path: &str, body: Value) {
        self.reply(path, 200, body.to_string());
    }

    /// Hold every reply back by `delay`
    pub fn delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    /// Requests seen so far as (path, JSON body); non-JSON bodies appear as null
    pub fn received(&self) -> Vec<(String, Value)> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_on(&self, path: &str) -> Vec<Value> {
        self.received()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body)
            .collect()
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(State(state): State<Arc<StubState>>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push((path.clone(), json));

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let reply = state.replies.lock().unwrap().get(&path).cloned();
    match reply {
        Some((status, body)) => {
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "no stub reply").into_response(),
    }
}

/// A base URL nothing is listening on
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
