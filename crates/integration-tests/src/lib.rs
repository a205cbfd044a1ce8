//! Integration tests for the Rahat Pay storefront client.
//!
//! The tests in `tests/` run the real HTTP client against [`StubServer`], a
//! local backend that answers with scripted JSON and records every request.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rahat-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let server = StubServer::start().await;
//! server.on("GET", "/products", StubResponse::data(json!([])));
//!
//! let storefront = Storefront::new(server.config())?;
//! assert!(storefront.catalog().products().await?.is_empty());
//! assert_eq!(server.requests().len(), 1);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use rahat_storefront::config::StorefrontConfig;

/// A scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    /// `status` with a JSON body.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// 200 with `payload` wrapped in a `data` envelope.
    #[must_use]
    pub fn data(payload: Value) -> Self {
        Self::json(200, &json!({ "data": payload }))
    }

    /// `status` with a Laravel-style `{"message": ...}` error body.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "message": message }))
    }

    /// `status` with no body.
    #[must_use]
    pub const fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// A request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including any query string.
    pub path: String,
    /// Header names are lower-cased.
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Debug)]
struct Route {
    method: String,
    path: String,
    /// Replies in order; the last one repeats once the rest are used up.
    replies: VecDeque<StubResponse>,
}

#[derive(Debug, Default)]
struct StubState {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

/// A local backend with scripted responses.
///
/// Unscripted routes answer 404. The server task is aborted on drop.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<Mutex<StubState>>,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(StubState::default()));

        let app = Router::new()
            .fallback(reply)
            .with_state(Arc::clone(&state));
        let task = tokio::spawn(async move {
            // The task is aborted on drop; a serve error just ends it early.
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Script replies for `method path`. Calling this again for the same
    /// route appends to its queue.
    pub fn on(&self, method: &str, path: &str, reply: StubResponse) -> &Self {
        let mut state = lock(&self.state);
        if let Some(route) = state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            route.replies.push_back(reply);
        } else {
            state.routes.push(Route {
                method: method.to_string(),
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            });
        }
        self
    }

    /// Base URL of the stub, e.g. `http://127.0.0.1:49152`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client configuration pointed at the stub with a short retry backoff.
    ///
    /// # Panics
    ///
    /// Panics if the stub URL does not parse, which cannot happen for a
    /// bound socket address.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::new(&self.url()).unwrap();
        config.retry_base_delay = Duration::from_millis(5);
        config.http_timeout = Some(Duration::from_secs(5));
        config
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lock(state: &Mutex<StubState>) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fallback handler: record the request and answer with the next scripted
/// reply for its route.
async fn reply(
    State(state): State<Arc<Mutex<StubState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let method = method.as_str().to_string();
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    let reply = {
        let mut state = lock(&state);
        let reply = state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
            .and_then(|route| {
                if route.replies.len() > 1 {
                    route.replies.pop_front()
                } else {
                    route.replies.front().cloned()
                }
            })
            .unwrap_or_else(|| StubResponse::error(404, "Not Found"));
        state.requests.push(RecordedRequest {
            method,
            path,
            headers: headers
                .iter()
                .filter_map(|(name, value)| {
                    Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
                })
                .collect(),
            body: serde_json::from_slice(&body).ok(),
        });
        reply
    };

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if reply.body.is_empty() {
        return status.into_response();
    }
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

/// Backend-shaped JSON fixtures.
pub mod fixtures {
    use serde_json::{Value, json};

    /// A digital product priced at `price` USD.
    #[must_use]
    pub fn product(id: i64, slug: &str, price: &str) -> Value {
        json!({
            "id": id,
            "en_name": format!("Product {id}"),
            "fa_name": "",
            "price": price,
            "discount": 0,
            "slug": slug,
            "is_featured": 0,
            "is_active": 1,
            "product_category_id": 1
        })
    }

    #[must_use]
    pub fn user(id: i64) -> Value {
        json!({
            "id": id,
            "name": "Alex Karimi",
            "email": "alex@example.com",
            "email_verified": 1,
            "is_admin": 0
        })
    }

    #[must_use]
    pub fn wallet(balance: &str) -> Value {
        json!({ "id": 1, "balance": balance, "is_active": 1, "user_id": 3 })
    }

    /// An order created for `product_id`.
    #[must_use]
    pub fn order(id: i64, product_id: i64, total_price: &str) -> Value {
        json!({
            "id": id,
            "pm_type": "wallet",
            "quantity": 1,
            "total_price": total_price,
            "is_paid": 0,
            "status": "pending",
            "product_id": product_id
        })
    }
}
