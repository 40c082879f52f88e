use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::token::ActionKind;
use crate::types::user::RCreatePassword;
use crate::utils::mail::{deliver, invite_mail, Mailer};
use crate::utils::token::TokenSigner;
use actix_web::{post, web};
use std::sync::Arc;
use tracing::info;

#[post("/join-from-invite/{user_id}/{token}")]
pub async fn join_from_invite(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    mailer: web::Data<dyn Mailer>,
    path: web::Path<(i32, String)>,
    body: web::Json<RCreatePassword>,
) -> ApiResult<MessageRes> {
    let (user_id, token) = path.into_inner();
    body.validate()?;

    match db.join_from_invite(&signer, user_id, &token, &body.password).await {
        Ok(()) => {
            info!("User {user_id} joined from invite");
            Ok(ApiResponse::Ok(MessageRes::new("Your password has been set. You can now log in.")))
        }
        Err(AppError::InvalidToken) => {
            // a stale invite gets replaced so the user is not stuck
            let user = db.get_user_by_id(user_id).await?;
            let fresh = signer.mint(ActionKind::Confirm, user.id, ActionKind::Confirm.default_ttl(), None)?;
            deliver(mailer.get_ref(), invite_mail(&config, &user, &fresh)).await;
            Err(AppError::InvalidToken)
        }
        Err(e) => Err(e),
    }
}
