//! Local HTTP stand-in for the resolver document and telemetry service.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
enum Body {
    Json(Value),
    Text(String),
    NotFound,
    ResolverToSelf,
}

#[derive(Debug, Clone)]
pub struct Route {
    body: Body,
    delay: Duration,
}

impl Route {
    pub fn json(value: Value) -> Self {
        Self::with_body(Body::Json(value))
    }

    pub fn text(text: &str) -> Self {
        Self::with_body(Body::Text(text.to_string()))
    }

    pub fn not_found() -> Self {
        Self::with_body(Body::NotFound)
    }

    /// Resolver document whose api_url points back at this server.
    pub fn resolver_to_self() -> Self {
        Self::with_body(Body::ResolverToSelf)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_body(body: Body) -> Self {
        Self {
            body,
            delay: Duration::ZERO,
        }
    }
}

struct Shared {
    base_url: String,
    resolver: Mutex<Route>,
    data: Mutex<Route>,
    resolver_hits: AtomicUsize,
    data_hits: AtomicUsize,
    data_started: Notify,
}

pub struct MockService {
    shared: Arc<Shared>,
}

impl MockService {
    pub async fn start(resolver: Route, data: Route) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock service");
        let addr: SocketAddr = listener.local_addr().expect("mock service address");

        let shared = Arc::new(Shared {
            base_url: format!("http://{}", addr),
            resolver: Mutex::new(resolver),
            data: Mutex::new(data),
            resolver_hits: AtomicUsize::new(0),
            data_hits: AtomicUsize::new(0),
            data_started: Notify::new(),
        });

        let router = Router::new()
            .route("/config.json", get(resolver_handler))
            .route("/data", get(data_handler))
            .with_state(shared.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { shared }
    }

    pub fn resolver_url(&self) -> String {
        format!("{}/config.json", self.shared.base_url)
    }

    pub fn set_data(&self, route: Route) {
        *self.shared.data.lock().unwrap() = route;
    }

    pub fn resolver_hits(&self) -> usize {
        self.shared.resolver_hits.load(Ordering::SeqCst)
    }

    pub fn data_hits(&self) -> usize {
        self.shared.data_hits.load(Ordering::SeqCst)
    }

    /// Resolves once a `/data` request has reached the server.
    pub async fn data_request_started(&self) {
        self.shared.data_started.notified().await;
    }
}

async fn resolver_handler(State(shared): State<Arc<Shared>>) -> Response {
    shared.resolver_hits.fetch_add(1, Ordering::SeqCst);
    let route = shared.resolver.lock().unwrap().clone();
    respond(route, &shared.base_url).await
}

async fn data_handler(State(shared): State<Arc<Shared>>) -> Response {
    shared.data_hits.fetch_add(1, Ordering::SeqCst);
    shared.data_started.notify_one();
    let route = shared.data.lock().unwrap().clone();
    respond(route, &shared.base_url).await
}

async fn respond(route: Route, base_url: &str) -> Response {
    if !route.delay.is_zero() {
        tokio::time::sleep(route.delay).await;
    }
    match route.body {
        Body::Json(value) => Json(value).into_response(),
        Body::Text(text) => text.into_response(),
        Body::NotFound => StatusCode::NOT_FOUND.into_response(),
        Body::ResolverToSelf => Json(json!({ "api_url": base_url })).into_response(),
    }
}
