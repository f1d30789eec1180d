//! In-process stand-in for the desktop client's control interface.
//!
//! `StubServer` answers every GET with the body returned by a handler
//! closure and keeps a log of the requests it saw. `FakeSpotify` is a
//! handler that behaves like the desktop client plus the public token
//! endpoint.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use spotify_remote_core::ClientConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ORIGIN: &str = "https://open.spotify.com";
pub const CSRF_TOKEN: &str = "csrf-token";

#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

type Handler = Arc<dyn Fn(&Request) -> String + Send + Sync>;

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<Request>>>,
    handler: Handler,
}

pub struct StubServer {
    pub port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Serve `handler` on an ephemeral loopback port.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        Self::listen(listener, Arc::new(handler))
    }

    /// Serve `handler` on a given loopback port, or `None` if it is taken.
    pub async fn start_on<F>(port: u16, handler: F) -> Option<Self>
    where
        F: Fn(&Request) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.ok()?;
        Some(Self::listen(listener, Arc::new(handler)))
    }

    fn listen(listener: TcpListener, handler: Handler) -> Self {
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new().fallback(record).with_state(StubState {
            requests: Arc::clone(&requests),
            handler,
        });
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { port, requests, task }
    }

    /// Base URL to put in `ClientConfig::base_url`
    pub fn base_url(&self) -> String {
        "http://127.0.0.1".to_string()
    }

    /// Absolute URL of a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn record(
    State(state): State<StubState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let request = Request {
        path: uri.path().to_string(),
        query,
        headers,
    };

    let body = (state.handler)(&request);
    state.requests.lock().expect("request log").push(request);

    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Handler behaving like the desktop client plus the public token endpoint
/// (served at `/token`).
#[derive(Debug, Clone)]
pub struct FakeSpotify {
    /// Bearer tokens the service accepts
    pub accepted: Vec<String>,
    /// Token handed out by `/token`
    pub issued: String,
    /// Body of a successful status call
    pub status: Value,
}

impl FakeSpotify {
    pub fn new(issued: &str) -> Self {
        Self {
            accepted: vec![issued.to_string()],
            issued: issued.to_string(),
            status: json!({"playing": false}),
        }
    }

    pub fn accepting(mut self, token: &str) -> Self {
        self.accepted.push(token.to_string());
        self
    }

    pub fn with_status(mut self, status: Value) -> Self {
        self.status = status;
        self
    }

    pub fn respond(&self, request: &Request) -> String {
        let authorized = request.param("csrf") == Some(CSRF_TOKEN)
            && request
                .param("oauth")
                .map(|t| self.accepted.iter().any(|a| a == t))
                .unwrap_or(false);

        let body = match request.path.as_str() {
            "/service/version.json" => json!({"version": 9, "client_version": "1.0.0.0", "running": true}),
            "/simplecsrf/token.json" if request.header("origin") == Some(ORIGIN) => {
                json!({"token": CSRF_TOKEN})
            }
            "/simplecsrf/token.json" => json!({"error": {"type": "4107", "message": "Invalid Csrf token"}}),
            "/token" => json!({"t": self.issued}),
            _ if !authorized => json!({"error": {"type": "4102", "message": "Invalid OAuth token"}}),
            "/remote/status.json" => self.status.clone(),
            "/remote/pause.json" => {
                json!({"playing": request.param("pause") != Some("true")})
            }
            "/remote/play.json" => json!({"playing": true}),
            "/remote/open.json" => json!({"running": true}),
            _ => json!({"error": {"type": "4001"}}),
        };
        body.to_string()
    }

    pub async fn serve(self) -> StubServer {
        StubServer::start(move |request| self.respond(request)).await
    }

    /// Serve on a given port, or `None` if it is taken.
    pub async fn serve_on(self, port: u16) -> Option<StubServer> {
        StubServer::start_on(port, move |request| self.respond(request)).await
    }
}

/// Configuration pointing every endpoint at the stub.
pub fn client_config(server: &StubServer, credential_path: PathBuf) -> ClientConfig {
    ClientConfig {
        base_url: server.base_url(),
        port_start: server.port,
        port_end: server.port,
        origin: ORIGIN.to_string(),
        token_url: server.url("/token"),
        request_timeout: Duration::from_secs(5),
        credential_path,
    }
}
