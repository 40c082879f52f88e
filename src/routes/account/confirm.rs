use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::token::ActionKind;
use crate::types::user::CurrentUser;
use crate::utils::mail::{confirm_account_mail, deliver, Mailer};
use crate::utils::token::TokenSigner;
use actix_web::{get, post, web};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Debug)]
pub struct UnconfirmedRes {
    pub confirmed: bool,
    pub message: String,
}

#[post("")]
pub async fn confirm_request(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    mailer: web::Data<dyn Mailer>,
    user: web::ReqData<CurrentUser>,
) -> ApiResult<MessageRes> {
    if user.confirmed {
        return Ok(ApiResponse::Ok(MessageRes::new("Your account is already confirmed.")));
    }
    let account = db.get_user_by_id(user.id).await?;
    let token = signer.mint(ActionKind::Confirm, account.id, ActionKind::Confirm.default_ttl(), None)?;
    deliver(mailer.get_ref(), confirm_account_mail(&config, &account, &token)).await;

    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "A new confirmation link has been sent to {}.",
        account.email
    ))))
}

#[post("/{token}")]
pub async fn confirm(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    user: web::ReqData<CurrentUser>,
    path: web::Path<String>,
) -> ApiResult<MessageRes> {
    if user.confirmed {
        return Ok(ApiResponse::Ok(MessageRes::new("Your account is already confirmed.")));
    }
    db.confirm_account(&signer, user.id, &path.into_inner()).await?;
    Ok(ApiResponse::Ok(MessageRes::new("Your account has been confirmed.")))
}

#[get("")]
pub async fn unconfirmed(user: web::ReqData<CurrentUser>) -> ApiResult<UnconfirmedRes> {
    let message = if user.confirmed {
        "Your account is confirmed."
    } else {
        "You have not confirmed your account yet. Check your inbox for the confirmation link."
    };
    Ok(ApiResponse::Ok(UnconfirmedRes {
        confirmed: user.confirmed,
        message: message.to_string(),
    }))
}
