use axum::{http::header, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;

/// GET /metrics — Prometheus text exposition of the process registry.
pub async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let encoder = TextEncoder::new();
    let mut exposition = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut exposition)
        .map_err(|e| AppError::internal("Failed to encode metrics", e.into()))?;

    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        exposition,
    ))
}
