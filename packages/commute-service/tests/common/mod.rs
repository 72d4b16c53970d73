#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_test::TestServer;
use commute_service::{config::Config, routes, state::AppState};
use parking_lot::Mutex;
use serde_json::{json, Value};

pub type Params = HashMap<String, String>;
pub type Responder = fn(&Params) -> (StatusCode, String);

pub const ALLOWED_ORIGIN: &str = "https://ihatedriving.web.app";
pub const MATRIX_PATH: &str = "/maps/api/distancematrix/json";

/// A local stand-in for the distance matrix API
pub struct FakeUpstream {
    pub base_url: String,
    queries: Arc<Mutex<Vec<Params>>>,
}

impl FakeUpstream {
    pub async fn start(responder: Responder) -> Self {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(MATRIX_PATH, get(matrix))
            .with_state((responder, queries.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            queries,
        }
    }

    pub fn matrix_url(&self) -> String {
        format!("{}{}", self.base_url, MATRIX_PATH)
    }

    pub fn queries(&self) -> Vec<Params> {
        self.queries.lock().clone()
    }
}

async fn matrix(
    State((responder, queries)): State<(Responder, Arc<Mutex<Vec<Params>>>)>,
    Query(params): Query<Params>,
) -> Response {
    queries.lock().push(params.clone());
    let (status, body) = responder(&params);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// A successful single-element distance matrix body
pub fn matrix_body(seconds: f64) -> Value {
    json!({
        "destination_addresses": ["Downtown, Winnipeg, MB, Canada"],
        "origin_addresses": ["St. Vital, Winnipeg, MB, Canada"],
        "rows": [{
            "elements": [{
                "distance": { "text": "6.1 mi", "value": 9817 },
                "duration": { "text": "14 mins", "value": seconds },
                "status": "OK"
            }]
        }],
        "status": "OK"
    })
}

pub fn element_status_body(status: &str) -> Value {
    json!({
        "destination_addresses": [""],
        "origin_addresses": [""],
        "rows": [{ "elements": [{ "status": status }] }],
        "status": "OK"
    })
}

pub fn test_config(upstream: &FakeUpstream) -> Config {
    Config {
        maps_api_key: "test-key".to_string(),
        distance_api_url: upstream.matrix_url(),
        max_retries: 0,
        retry_backoff_ms: 1,
        request_timeout_secs: 5,
        ..Config::default()
    }
}

/// Serve the full router on a local port, returning its base URL
pub async fn serve_router(config: Config) -> String {
    let state = AppState::initialize(config).unwrap();
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn test_server(config: Config) -> TestServer {
    let state = AppState::initialize(config).unwrap();
    TestServer::new(routes::router(state)).unwrap()
}
