//! Scripted stand-in for the Gemini API
//!
//! Serves any POST path, records what it receives and answers with the
//! next scripted response. The last scripted response repeats forever.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// One request as seen by the fake upstream
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Clone)]
enum ScriptedReply {
    Json(u16, Value),
    Raw(u16, String),
}

#[derive(Default)]
struct Script {
    replies: VecDeque<ScriptedReply>,
    requests: Vec<RecordedRequest>,
}

type SharedScript = Arc<Mutex<Script>>;

pub struct FakeGemini {
    /// Value to configure as the Gemini base URL
    pub base_url: String,
    script: SharedScript,
    shutdown: CancellationToken,
}

async fn handle(
    State(script): State<SharedScript>,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let reply = {
        let mut script = script.lock().unwrap();
        script.requests.push(RecordedRequest {
            path: format!("/{}", path),
            query,
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });
        if script.replies.len() > 1 {
            script.replies.pop_front()
        } else {
            script.replies.front().cloned()
        }
    };

    match reply {
        Some(ScriptedReply::Json(status, body)) => (status_code(status), Json(body)).into_response(),
        Some(ScriptedReply::Raw(status, body)) => (status_code(status), body).into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "message": "FakeGemini has no scripted reply" } })),
        )
            .into_response(),
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("Invalid scripted status")
}

impl FakeGemini {
    /// Spawns the fake upstream on a random port
    pub async fn spawn() -> Self {
        let script: SharedScript = Arc::default();

        let app = Router::new()
            .route("/{*path}", post(handle))
            .with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let shutdown = CancellationToken::new();
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/v1beta/models", port),
            script,
            shutdown,
        }
    }

    fn push(&self, reply: ScriptedReply) {
        self.script.lock().unwrap().replies.push_back(reply);
    }

    /// Queues an arbitrary JSON reply
    pub fn reply_json(&self, status: u16, body: Value) {
        self.push(ScriptedReply::Json(status, body));
    }

    /// Queues a non-JSON reply
    pub fn reply_raw(&self, status: u16, body: &str) {
        self.push(ScriptedReply::Raw(status, body.to_string()));
    }

    /// Queues a successful reply with a single candidate carrying `text`
    pub fn reply_text(&self, text: &str) {
        self.reply_json(
            200,
            json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": text }] },
                    "finishReason": "STOP",
                    "safetyRatings": []
                }]
            }),
        );
    }

    /// Queues an HTTP error in the upstream's error envelope
    pub fn reply_error(&self, status: u16, message: &str) {
        self.reply_json(
            status,
            json!({ "error": { "code": status, "message": message, "status": "UNAVAILABLE" } }),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }
}

impl Drop for FakeGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
