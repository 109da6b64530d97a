// Keep-alive HTTP service - answers liveness probes so the host isn't idled out

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const ALIVE_MESSAGE: &str = "Panel deployment is running!";

#[derive(Debug, Clone)]
pub struct KeepAliveState {
    started_at: DateTime<Utc>,
}

impl KeepAliveState {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    fn uptime_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AliveResponse {
    pub status: String,
    pub uptime_seconds: i64,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn router(state: KeepAliveState) -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/ping", get(ping))
        .route("/health", get(health))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// One info line per request: client address, method and uri
async fn log_request(req: Request, next: Next) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());
    tracing::info!("{} - {} {}", client, req.method(), req.uri());
    next.run(req).await
}

async fn alive(State(state): State<Arc<KeepAliveState>>) -> Json<AliveResponse> {
    let now = Utc::now();
    Json(AliveResponse {
        status: "Alive".to_string(),
        uptime_seconds: state.uptime_seconds(now),
        message: ALIVE_MESSAGE.to_string(),
        timestamp: timestamp(now),
    })
}

async fn ping() -> &'static str {
    "pong"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: timestamp(Utc::now()),
    })
}

/// Bind on all interfaces and serve until the process is killed
pub async fn serve(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Keep-alive server started on port {}", port);

    let app = router(KeepAliveState::new(Utc::now()));
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}
