use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::jwt::JwtSettings;
use crate::errors::AppError;
use crate::models::user::TokenClaims;

/// Caller identity taken from a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_settings = req
        .app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| AppError::Internal("JWT settings not registered".into()))?;

    let auth_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("No authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".into()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;
    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty token".into()));
    }

    let claims = decode_token(token, jwt_settings).map_err(|e| {
        tracing::info!("Rejected token: {:?}", e);
        AppError::Unauthorized("Invalid token".into())
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    Ok(AuthenticatedUser {
        user_id,
        username: claims.username,
    })
}

pub fn generate_token(
    user_id: Uuid,
    username: &str,
    jwt_settings: &JwtSettings,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(jwt_settings.expiration_hours);

    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_settings.secret.expose_secret().as_bytes()),
    )
}

pub fn decode_token(
    token: &str,
    jwt_settings: &JwtSettings,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_settings.secret.expose_secret().as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
