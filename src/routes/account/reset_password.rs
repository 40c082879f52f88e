use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::token::ActionKind;
use crate::types::user::{RResetPassword, RResetPasswordRequest};
use crate::utils::mail::{deliver, reset_password_mail, Mailer};
use crate::utils::token::TokenSigner;
use actix_web::{post, web};
use std::sync::Arc;
use tracing::debug;

#[post("/reset-password")]
pub async fn reset_password_request(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<RResetPasswordRequest>,
) -> ApiResult<MessageRes> {
    match db.get_user_by_email(&body.email).await {
        Ok(user) => {
            let token = signer.mint(ActionKind::Reset, user.id, ActionKind::Reset.default_ttl(), None)?;
            let mail = reset_password_mail(&config, &user, &token, body.next.as_deref());
            deliver(mailer.get_ref(), mail).await;
        }
        Err(AppError::NotFound) => debug!("reset requested for unknown address"),
        Err(e) => return Err(e),
    }

    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "A password reset link has been sent to {}.",
        body.email
    ))))
}

#[post("/reset-password/{token}")]
pub async fn reset_password(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    path: web::Path<String>,
    body: web::Json<RResetPassword>,
) -> ApiResult<MessageRes> {
    body.validate()?;
    db.reset_password(&signer, &body.email, &path.into_inner(), &body.new_password)
        .await?;
    Ok(ApiResponse::Ok(MessageRes::new("Your password has been updated.")))
}
