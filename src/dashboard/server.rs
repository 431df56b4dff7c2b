// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

use crate::dashboard::state::{DashboardState, FileStateSummary};
use crate::observability::{ErrorEntry, StageMetrics, TraceEntry};

const DEFAULT_SNAPSHOT_LIMIT: usize = 50;

#[derive(Debug, Serialize, PartialEq)]
pub struct StatsBody {
    pub processed: u64,
    pub errors: u64,
    pub elapsed_seconds: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TraceBody {
    pub tag_path: Vec<String>,
    pub content: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub stage: String,
    pub content: String,
    pub error: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotParams {
    pub limit: Option<usize>,
}

fn epoch_ms(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl From<&StageMetrics> for StatsBody {
    fn from(metrics: &StageMetrics) -> Self {
        Self {
            processed: metrics.processed,
            errors: metrics.errors,
            elapsed_seconds: metrics.elapsed.as_secs_f64(),
        }
    }
}

impl From<TraceEntry> for TraceBody {
    fn from(entry: TraceEntry) -> Self {
        Self {
            tag_path: entry.tag_path,
            content: entry.content,
            timestamp_ms: epoch_ms(entry.timestamp),
        }
    }
}

impl From<ErrorEntry> for ErrorBody {
    fn from(entry: ErrorEntry) -> Self {
        Self {
            stage: entry.stage,
            content: entry.content,
            error: entry.error,
            timestamp_ms: epoch_ms(entry.timestamp),
        }
    }
}

/// Build the dashboard route table over injected state.
pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/stats", get(handle_stats))
        .route("/traces", get(handle_traces))
        .route("/errors", get(handle_errors))
        .route("/file_state", get(handle_file_state))
        .with_state(state)
}

/// Bind and serve the dashboard until the process exits.
pub async fn serve(state: Arc<DashboardState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_stats(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<HashMap<String, StatsBody>>, StatusCode> {
    let store = state.store().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let stats = store
        .snapshot_metrics()
        .iter()
        .map(|(stage, metrics)| (stage.clone(), StatsBody::from(metrics)))
        .collect();
    Ok(Json(stats))
}

async fn handle_traces(
    State(state): State<Arc<DashboardState>>,
    Query(params): Query<SnapshotParams>,
) -> Result<Json<Vec<TraceBody>>, StatusCode> {
    let store = state.store().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let limit = params.limit.unwrap_or(DEFAULT_SNAPSHOT_LIMIT);
    let traces = store
        .snapshot_traces(limit)
        .into_iter()
        .map(TraceBody::from)
        .collect();
    Ok(Json(traces))
}

async fn handle_errors(
    State(state): State<Arc<DashboardState>>,
    Query(params): Query<SnapshotParams>,
) -> Result<Json<Vec<ErrorBody>>, StatusCode> {
    let store = state.store().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let limit = params.limit.unwrap_or(DEFAULT_SNAPSHOT_LIMIT);
    let errors = store
        .snapshot_errors(limit)
        .into_iter()
        .map(ErrorBody::from)
        .collect();
    Ok(Json(errors))
}

async fn handle_file_state(
    State(state): State<Arc<DashboardState>>,
) -> Json<FileStateSummary> {
    Json(state.ingest().snapshot())
}
