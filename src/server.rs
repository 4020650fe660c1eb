// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Metrics and health endpoints.
//!
//! - `GET /metrics` - Prometheus text exposition of [`crate::metrics`]
//! - `GET /healthz` - liveness, always `200 ok`
//! - `GET /readyz` - `200` once the ingress cache has synced, `503` before

use crate::cache::SyncStatus;
use crate::metrics::gather_metrics;
use anyhow::{Context as _, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// State shared by the HTTP handlers.
#[derive(Clone)]
pub struct ServerState {
    sync_status: watch::Receiver<SyncStatus>,
}

impl ServerState {
    /// Create handler state observing the cache's sync status.
    #[must_use]
    pub fn new(sync_status: watch::Receiver<SyncStatus>) -> Self {
        Self { sync_status }
    }
}

/// Build the router serving all endpoints.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// Bind the metrics listener. Called at startup so a taken port is fatal.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {addr}"))
}

/// Serve the endpoints on `listener` until `cancel` fires.
///
/// # Errors
///
/// Returns an error if serving fails.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    cancel: CancellationToken,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Serving metrics and health endpoints on {addr}");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("metrics server failed")
}

async fn metrics_handler() -> Response {
    match gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(state): State<ServerState>) -> (StatusCode, &'static str) {
    if state.sync_status.borrow().is_synced() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "cache not synced")
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
