use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult};
use actix_web::{get, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Serialize, Debug)]
pub struct HealthRes {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness plus a database round trip.
#[get("")]
pub async fn health(db: web::Data<Arc<PostgresService>>) -> ApiResult<HealthRes> {
    db.ping().await.map_err(|e| {
        warn!("health check: database unreachable: {e}");
        AppError::Internal("database unreachable".into())
    })?;
    Ok(ApiResponse::Ok(HealthRes {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
