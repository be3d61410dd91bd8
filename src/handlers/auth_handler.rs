// src/handlers/auth_handler.rs
use actix_web::{web, HttpResponse};

use crate::auth::jwt::AuthenticatedUser;
use crate::config::jwt::JwtSettings;
use crate::db::AccountRepository;
use crate::errors::AppError;
use crate::models::auth::LoginRequest;
use crate::models::common::ApiResponse;
use crate::models::user::RegistrationRequest;
use crate::services::account_service;

#[tracing::instrument(
    name = "Adding a new user",
    // Don't show arguments
    skip(user_form, repo, jwt_settings),
    fields(
        username = %user_form.username,
        email = %user_form.email
    )
)]
pub async fn register_user<A: AccountRepository>(
    user_form: web::Json<RegistrationRequest>,
    repo: web::Data<A>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let auth = account_service::register(repo.get_ref(), &jwt_settings, &user_form).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("User registered successfully", auth)))
}

#[tracing::instrument(
    name = "Login user attempt",
    skip(login_form, repo, jwt_settings),
    fields(
        username = %login_form.username
    )
)]
pub async fn login_user<A: AccountRepository>(
    login_form: web::Json<LoginRequest>,
    repo: web::Data<A>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let auth = account_service::login(repo.get_ref(), &jwt_settings, &login_form).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Login successful", auth)))
}

#[tracing::instrument(
    name = "Current user",
    skip(user, repo),
    fields(user_id = %user.user_id, username = %user.username)
)]
pub async fn me<A: AccountRepository>(
    user: AuthenticatedUser,
    repo: web::Data<A>,
) -> Result<HttpResponse, AppError> {
    let profile = account_service::profile(repo.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("User retrieved", profile)))
}
