use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::token::ActionKind;
use crate::types::user::{DBUserCreate, RRegister};
use crate::utils::mail::{confirm_account_mail, deliver, Mailer};
use crate::utils::token::TokenSigner;
use actix_web::{post, web};
use std::sync::Arc;

pub(crate) const EMAIL_TAKEN: &str = "Email already registered.";

#[post("/register")]
pub async fn register(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<RRegister>,
) -> ApiResult<MessageRes> {
    let body = body.into_inner();
    body.validate()?;

    if db.user_exists_by_email(&body.email).await? {
        return Err(AppError::Validation(EMAIL_TAKEN.into()));
    }

    let role = db
        .role_for_new_user(&body.email, config.admin_email.as_deref())
        .await?;

    let user = match db
        .create_user(DBUserCreate {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: Some(body.password),
            confirmed: false,
            role_id: role.map(|r| r.id),
        })
        .await
    {
        Ok(user) => user,
        Err(AppError::AlreadyExists) => return Err(AppError::Validation(EMAIL_TAKEN.into())),
        Err(e) => return Err(e),
    };

    let token = signer.mint(ActionKind::Confirm, user.id, ActionKind::Confirm.default_ttl(), None)?;
    deliver(mailer.get_ref(), confirm_account_mail(&config, &user, &token)).await;

    Ok(ApiResponse::Created(MessageRes::new(format!(
        "A confirmation link has been sent to {}.",
        user.email
    ))))
}
