//! HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : Prometheus text format; query pairs filter by label

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use promexp_core::LabelFilter;

use crate::app_state::AppState;
use crate::error::HttpError;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, HttpError> {
    let filter: LabelFilter = pairs.into_iter().collect();
    let body = state.exporter().export(&filter).await.map_err(|e| {
        tracing::warn!(error = %e, "export failed");
        HttpError(e)
    })?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}
