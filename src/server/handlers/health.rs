//! Liveness handler.

use axum::Json;

use super::super::types::HealthResponse;
use crate::geoip;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        geoip: geoip::is_enabled(),
        geoip_version: geoip::get_metadata().map(|metadata| metadata.version),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
