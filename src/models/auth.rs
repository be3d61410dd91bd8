// src/models/auth.rs
use serde::{Deserialize, Serialize};
use secrecy::SecretString;

use crate::models::user::AccountProfile;

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    #[serde(serialize_with = "crate::models::user::serialize_secret_string",
            deserialize_with = "crate::models::user::deserialize_secret_string")]
    pub password: SecretString,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountProfile,
}
