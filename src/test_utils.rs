//! Test utilities for spendwise
//!
//! This module provides testing infrastructure including a mock classifier
//! oracle server that speaks the real wire protocol, for development and
//! integration tests.

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock classifier oracle server for testing and development
///
/// Serves `POST /classify` and `GET /health` on an ephemeral port. The
/// classification is a fixed keyword heuristic; the sentinel description
/// `"TRIGGER SERVER ERROR"` makes the endpoint return HTTP 500 so callers
/// can exercise their failure paths.
pub struct MockOracleServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOracleServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/classify", post(handle_classify));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOracleServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

async fn handle_classify(Json(request): Json<ClassifyRequest>) -> impl IntoResponse {
    let text = request.text.to_uppercase();

    if text.contains("TRIGGER SERVER ERROR") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "oracle exploded").into_response();
    }

    let (label, confidence) = if text.contains("STARBUCKS")
        || text.contains("COFFEE")
        || text.contains("RESTAURANT")
        || text.contains("CHIPOTLE")
    {
        ("Food & Dining", 0.91)
    } else if text.contains("UBER") || text.contains("LYFT") || text.contains("SHELL") {
        ("Transportation", 0.93)
    } else if text.contains("NETFLIX") || text.contains("SPOTIFY") || text.contains("CINEMA") {
        ("Entertainment", 0.95)
    } else if text.contains("AMAZON") || text.contains("TARGET") {
        ("Shopping", 0.88)
    } else if text.contains("PHARMACY") || text.contains("CLINIC") {
        ("Healthcare", 0.90)
    } else if text.contains("ELECTRIC") || text.contains("INTERNET BILL") {
        ("Utilities", 0.87)
    } else {
        // Unrecognized text comes back with low confidence, which a caller
        // with the default acceptance threshold will reject
        ("Other", 0.30)
    };

    Json(ClassifyResponse {
        label: label.to_string(),
        confidence,
    })
    .into_response()
}

// Wire types mirroring the oracle protocol

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    text: String,
    #[allow(dead_code)]
    candidate_labels: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    label: String,
    confidence: f64,
}
