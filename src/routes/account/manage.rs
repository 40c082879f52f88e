use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::user::{CurrentUser, RChangePassword, UserInfo};
use actix_web::{get, post, web};
use std::sync::Arc;

#[get("")]
pub async fn manage(
    db: web::Data<Arc<PostgresService>>,
    user: web::ReqData<CurrentUser>,
) -> ApiResult<UserInfo> {
    let (user, role) = db.get_user_with_role(user.id).await?;
    Ok(ApiResponse::Ok(UserInfo::new(&user, role.as_ref())))
}

#[post("/change-password")]
pub async fn change_password(
    db: web::Data<Arc<PostgresService>>,
    user: web::ReqData<CurrentUser>,
    body: web::Json<RChangePassword>,
) -> ApiResult<MessageRes> {
    body.validate()?;

    match db.verify_credentials(&user.email, &body.old_password).await {
        Ok(_) => {}
        Err(AppError::Unauthorized(_)) => {
            return Err(AppError::Validation("Original password is invalid.".into()))
        }
        Err(e) => return Err(e),
    }
    db.set_password(user.id, &body.new_password).await?;

    Ok(ApiResponse::Ok(MessageRes::new("Your password has been updated.")))
}
