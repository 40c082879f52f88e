use actix_web::{dev::ServiceRequest, web, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use std::sync::Arc;
use tracing::debug;

use crate::db::postgres_service::PostgresService;
use crate::types::{
    error::AppError,
    permission::{can, Permission},
    token::ActionKind,
    user::CurrentUser,
};
use crate::utils::token::TokenSigner;

const BAD_SESSION: &str = "Invalid or expired session.";

async fn authenticate(req: &ServiceRequest, token: &str) -> Result<CurrentUser, AppError> {
    let signer = req
        .app_data::<web::Data<TokenSigner>>()
        .ok_or_else(|| AppError::Internal("token signer not configured".into()))?;
    let db = req
        .app_data::<web::Data<Arc<PostgresService>>>()
        .ok_or_else(|| AppError::Internal("database not configured".into()))?;

    let claims = signer.verify(token, ActionKind::Session).map_err(|e| {
        debug!("session rejected: {e}");
        AppError::Unauthorized(BAD_SESSION.into())
    })?;

    match db.load_current_user(claims.user_id).await {
        Ok(user) => Ok(user),
        // account deleted while the session was still alive
        Err(AppError::NotFound) => Err(AppError::Unauthorized(BAD_SESSION.into())),
        Err(e) => Err(e),
    }
}

/// Bearer guard: resolves the session token to a `CurrentUser` stored in the
/// request extensions. Handlers read it back with `web::ReqData<CurrentUser>`.
pub async fn validate_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (actix_web::Error, ServiceRequest)> {
    match authenticate(&req, credentials.token()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

/// Yes/no for a principal. Anonymous callers hold `Permission::NONE`.
/// Unconfirmed accounts are held back from anything that needs a permission.
pub fn authorize(principal: Option<&CurrentUser>, required: Permission) -> Result<(), AppError> {
    let mask = principal.map(CurrentUser::permissions).unwrap_or(Permission::NONE);
    if !can(mask, required) {
        return Err(AppError::Forbidden);
    }
    if required != Permission::NONE && principal.is_some_and(|u| !u.confirmed) {
        return Err(AppError::Unconfirmed);
    }
    Ok(())
}

/// Bearer guard for scopes that need a capability, e.g.
/// `HttpAuthentication::bearer(|req, c| permission_required(req, c, Permission::ADMINISTER))`.
pub async fn permission_required(
    req: ServiceRequest,
    credentials: BearerAuth,
    permission: Permission,
) -> Result<ServiceRequest, (actix_web::Error, ServiceRequest)> {
    let req = validate_token(req, credentials).await?;
    let outcome = authorize(req.extensions().get::<CurrentUser>(), permission);
    match outcome {
        Ok(()) => Ok(req),
        Err(e) => {
            debug!("denied {} (needs {permission})", req.path());
            Err((e.into(), req))
        }
    }
}
