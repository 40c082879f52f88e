use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::user::{CurrentUser, RChangeAccountType};
use actix_web::{post, web};
use std::sync::Arc;

#[post("/user/{id}/change-account-type")]
pub async fn change_account_type(
    db: web::Data<Arc<PostgresService>>,
    admin: web::ReqData<CurrentUser>,
    path: web::Path<i32>,
    body: web::Json<RChangeAccountType>,
) -> ApiResult<MessageRes> {
    let user_id = path.into_inner();
    if user_id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot change the type of your own account. Ask another administrator to do it.".into(),
        ));
    }
    let user = db.get_user_by_id(user_id).await?;
    let role = db.get_role_by_name(&body.role).await?;
    db.set_role(user.id, role.id).await?;
    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "Account type for user {} changed to {}.",
        user.full_name(),
        role.name
    ))))
}
