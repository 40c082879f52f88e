use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::types::response::{ApiResponse, ApiResult};
use crate::types::token::ActionKind;
use crate::types::user::{LoginRes, RLogin};
use crate::utils::token::{TokenError, TokenSigner};
use actix_web::{post, web};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

const REMEMBER_ME_DAYS: i64 = 30;

#[post("/login")]
pub async fn login(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    body: web::Json<RLogin>,
) -> ApiResult<LoginRes> {
    let user = db.verify_credentials(&body.email, &body.password).await?;
    let current = db.load_current_user(user.id).await?;

    let ttl = if body.remember_me {
        Duration::days(REMEMBER_ME_DAYS)
    } else {
        Duration::try_hours(config.session_ttl_hours).ok_or(TokenError::OutOfRange)?
    };
    let now = Utc::now();
    let token = signer.mint_at(ActionKind::Session, user.id, ttl, None, now)?;
    let expires_at = now.checked_add_signed(ttl).ok_or(TokenError::OutOfRange)?;
    info!("User {} logged in", user.id);

    Ok(ApiResponse::Ok(LoginRes {
        token,
        expires_at,
        confirmed: current.confirmed,
        index: current.role.map(|r| r.index),
    }))
}
