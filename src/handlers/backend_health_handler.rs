use actix_web::HttpResponse;

use crate::errors::AppError;
use crate::models::common::ApiResponse;

pub async fn backend_health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()>::success_message("ok"))
}

/// Fallback for every unmatched route.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".into()))
}
