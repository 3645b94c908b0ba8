//! Common test utilities and fixture helpers.
//!
//! [`MockServer`] runs an `axum` router on a loopback port. It answers with a
//! fixed queue of canned responses and records what it was sent so tests can
//! assert on the outbound request.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use tokio::sync::oneshot;

use waymap_lib::{Node, Path, Way};

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

#[derive(Clone, Default)]
struct MockState {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn respond(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    state.requests.lock().expect("requests lock").push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, body) = state
        .responses
        .lock()
        .expect("responses lock")
        .pop_front()
        .unwrap_or((500, "no canned response left".to_string()));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONNECTION, "close"),
        ],
        body,
    )
}

pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Serve `responses` (status, body) in order, one per request.
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let state = MockState {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        };
        let requests = Arc::clone(&state.requests);

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener
            .set_nonblocking(true)
            .expect("non-blocking listener");
        let addr = listener.local_addr().expect("local addr");

        let app = Router::new().fallback(respond).with_state(state);
        let (shutdown, signal) = oneshot::channel::<()>();

        // The client under test is blocking, so the server gets its own runtime thread.
        let handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = signal.await;
                    })
                    .await
                    .expect("mock server runs");
            });
        });

        Self {
            addr,
            requests,
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Three candidate paths between the standard test endpoints.
pub fn sample_paths() -> Vec<Path> {
    vec![
        Path::new(
            "path-0",
            512.3,
            vec![Node::new("1", 51.069, 4.030), Node::new("2", 51.070, 4.032)],
        ),
        Path::new(
            "path-1",
            498.0,
            vec![
                Node::new("1", 51.069, 4.030),
                Node::new("3", 51.0695, 4.031),
                Node::new("2", 51.070, 4.032),
            ],
        ),
        Path::new(
            "path-2",
            530.9,
            vec![Node::new("1", 51.069, 4.030), Node::new("2", 51.070, 4.032)],
        ),
    ]
}

/// A small road network around the default map center.
pub fn sample_ways() -> Vec<Way> {
    vec![
        Way::new(
            "100",
            vec![Node::new("1", 51.069, 4.030), Node::new("3", 51.0695, 4.031)],
        ),
        Way::new(
            "101",
            vec![Node::new("3", 51.0695, 4.031), Node::new("2", 51.070, 4.032)],
        ),
    ]
}
