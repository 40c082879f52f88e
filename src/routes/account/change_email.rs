use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::routes::account::register::EMAIL_TAKEN;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::token::ActionKind;
use crate::types::user::{CurrentUser, RChangeEmail};
use crate::utils::mail::{change_email_mail, deliver, Mailer};
use crate::utils::token::TokenSigner;
use actix_web::{post, web};
use std::sync::Arc;

#[post("/change-email")]
pub async fn change_email_request(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    mailer: web::Data<dyn Mailer>,
    user: web::ReqData<CurrentUser>,
    body: web::Json<RChangeEmail>,
) -> ApiResult<MessageRes> {
    let body = body.into_inner();
    body.validate()?;

    let account = match db.verify_credentials(&user.email, &body.password).await {
        Ok(account) => account,
        Err(AppError::Unauthorized(_)) => {
            return Err(AppError::Validation("Invalid email or password.".into()))
        }
        Err(e) => return Err(e),
    };
    if db.user_exists_by_email(&body.email).await? {
        return Err(AppError::Validation(EMAIL_TAKEN.into()));
    }

    let token = signer.mint(
        ActionKind::ChangeEmail,
        account.id,
        ActionKind::ChangeEmail.default_ttl(),
        Some(body.email.clone()),
    )?;
    deliver(mailer.get_ref(), change_email_mail(&config, &account, &body.email, &token)).await;

    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "An email with instructions to confirm your new email address has been sent to {}.",
        body.email
    ))))
}

#[post("/change-email/{token}")]
pub async fn change_email(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    user: web::ReqData<CurrentUser>,
    path: web::Path<String>,
) -> ApiResult<MessageRes> {
    let new_email = db.change_email(&signer, user.id, &path.into_inner()).await?;
    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "Your email address has been updated to {new_email}."
    ))))
}
