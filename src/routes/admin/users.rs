use crate::db::postgres_service::PostgresService;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::user::{CurrentUser, UserInfo};
use actix_web::{delete, get, web};
use std::sync::Arc;

#[get("/users")]
pub async fn registered_users(db: web::Data<Arc<PostgresService>>) -> ApiResult<Vec<UserInfo>> {
    let users = db
        .list_users_with_roles()
        .await?
        .iter()
        .map(|(user, role)| UserInfo::new(user, role.as_ref()))
        .collect();
    Ok(ApiResponse::Ok(users))
}

#[get("/user/{id}")]
pub async fn user_info(
    db: web::Data<Arc<PostgresService>>,
    path: web::Path<i32>,
) -> ApiResult<UserInfo> {
    let (user, role) = db.get_user_with_role(path.into_inner()).await?;
    Ok(ApiResponse::Ok(UserInfo::new(&user, role.as_ref())))
}

#[delete("/user/{id}")]
pub async fn delete_user(
    db: web::Data<Arc<PostgresService>>,
    admin: web::ReqData<CurrentUser>,
    path: web::Path<i32>,
) -> ApiResult<MessageRes> {
    let user_id = path.into_inner();
    if user_id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account. Ask another administrator to do it.".into(),
        ));
    }
    let user = db.get_user_by_id(user_id).await?;
    db.delete_user(user.id).await?;
    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "Successfully deleted user {}.",
        user.full_name()
    ))))
}
