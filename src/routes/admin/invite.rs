use crate::config::EnvConfig;
use crate::db::postgres_service::PostgresService;
use crate::routes::account::register::EMAIL_TAKEN;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult};
use crate::types::token::ActionKind;
use crate::types::user::{DBUserCreate, RInviteUser, UserInfo};
use crate::utils::mail::{deliver, invite_mail, Mailer};
use crate::utils::token::TokenSigner;
use actix_web::{post, web};
use std::sync::Arc;

#[post("/invite-user")]
pub async fn invite_user(
    db: web::Data<Arc<PostgresService>>,
    signer: web::Data<TokenSigner>,
    config: web::Data<EnvConfig>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<RInviteUser>,
) -> ApiResult<UserInfo> {
    let body = body.into_inner();
    body.validate()?;
    let role = db.get_role_by_name(&body.role).await?;

    let user = match db
        .create_user(DBUserCreate {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: None,
            confirmed: false,
            role_id: Some(role.id),
        })
        .await
    {
        Ok(user) => user,
        Err(AppError::AlreadyExists) => return Err(AppError::Validation(EMAIL_TAKEN.into())),
        Err(e) => return Err(e),
    };

    let token = signer.mint(ActionKind::Confirm, user.id, ActionKind::Confirm.default_ttl(), None)?;
    deliver(mailer.get_ref(), invite_mail(&config, &user, &token)).await;

    Ok(ApiResponse::Created(UserInfo::new(&user, Some(&role))))
}
