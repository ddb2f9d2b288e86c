//! In-process HTTP server standing in for the remote service in tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::net::TcpListener;

use crate::client::{Client, ClientConfig};

/// What the mock saw for one request.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: String,
    pub user_agent: Option<String>,
}

/// Canned reply served for every request.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            headers: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            ..Self::ok(body)
        }
    }
}

/// Start a server answering every request with `reply`.
///
/// Returns the base URL (`http://127.0.0.1:<port>/v1`) and the request log.
pub async fn start(reply: Reply) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        let app = axum::Router::new().fallback(move |request: Request<Body>| {
            let reply = reply.clone();
            let log = log.clone();
            async move {
                log.lock().unwrap().push(Seen {
                    method: request.method().to_string(),
                    path: request.uri().path().to_string(),
                    query: request.uri().query().unwrap_or("").to_string(),
                    user_agent: request
                        .headers()
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned),
                });
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                let mut response = axum::response::Response::new(Body::from(reply.body));
                *response.status_mut() = reply.status;
                for (name, value) in &reply.headers {
                    response
                        .headers_mut()
                        .insert(*name, axum::http::HeaderValue::from_static(value));
                }
                response
            }
        });
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), seen)
}

/// Client pointed at a mock base URL with a short timeout.
pub fn client(base_url: &str) -> Client {
    Client::new(ClientConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_millis(500),
        ..ClientConfig::default()
    })
    .unwrap()
}
