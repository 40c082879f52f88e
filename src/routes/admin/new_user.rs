use crate::db::postgres_service::PostgresService;
use crate::routes::account::register::EMAIL_TAKEN;
use crate::types::error::AppError;
use crate::types::response::{ApiResponse, ApiResult};
use crate::types::user::{DBUserCreate, RNewUser, UserInfo};
use actix_web::{post, web};
use std::sync::Arc;

/// Admin-created accounts are confirmed up front.
#[post("/new-user")]
pub async fn new_user(
    db: web::Data<Arc<PostgresService>>,
    body: web::Json<RNewUser>,
) -> ApiResult<UserInfo> {
    let body = body.into_inner();
    body.validate()?;
    let role = db.get_role_by_name(&body.role).await?;

    let user = match db
        .create_user(DBUserCreate {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: Some(body.password),
            confirmed: true,
            role_id: Some(role.id),
        })
        .await
    {
        Ok(user) => user,
        Err(AppError::AlreadyExists) => return Err(AppError::Validation(EMAIL_TAKEN.into())),
        Err(e) => return Err(e),
    };

    Ok(ApiResponse::Created(UserInfo::new(&user, Some(&role))))
}
