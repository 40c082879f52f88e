use actix_web::{HttpResponse, Responder};
use serde::Serialize;

use crate::types::error::AppError;

/// Success side of every handler; failures go through `AppError`.
pub enum ApiResponse<T> {
    Ok(T),
    Created(T),
}

impl<T: Serialize> Responder for ApiResponse<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _: &actix_web::HttpRequest) -> HttpResponse {
        match self {
            ApiResponse::Ok(body) => HttpResponse::Ok().json(body),
            ApiResponse::Created(body) => HttpResponse::Created().json(body),
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Plain `{"message": ...}` body for actions with nothing else to return.
#[derive(Serialize, Debug)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
