use crate::db::postgres_service::PostgresService;
use crate::types::response::{ApiResponse, ApiResult, MessageRes};
use crate::types::user::RChangeUserEmail;
use actix_web::{post, web};
use std::sync::Arc;

#[post("/user/{id}/change-email")]
pub async fn change_user_email(
    db: web::Data<Arc<PostgresService>>,
    path: web::Path<i32>,
    body: web::Json<RChangeUserEmail>,
) -> ApiResult<MessageRes> {
    body.validate()?;
    let user = db.get_user_by_id(path.into_inner()).await?;
    db.set_email(user.id, body.email.clone()).await?;
    Ok(ApiResponse::Ok(MessageRes::new(format!(
        "Email for user {} successfully changed to {}.",
        user.full_name(),
        body.email
    ))))
}
