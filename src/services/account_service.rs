use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::auth::jwt::generate_token;
use crate::config::jwt::JwtSettings;
use crate::db::AccountRepository;
use crate::errors::AppError;
use crate::models::auth::{AuthResponse, LoginRequest};
use crate::models::user::{Account, AccountProfile, NewAccount, RegistrationRequest};
use crate::utils::password::{hash_password_blocking, verify_password_blocking};

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=30;
const PASSWORD_CHARS: std::ops::RangeInclusive<usize> = 6..=128;
const MAX_EMAIL_CHARS: usize = 254;

fn valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

/// Returns the normalised `(username, email)` pair.
pub fn validate_registration(request: &RegistrationRequest) -> Result<(String, String), AppError> {
    let username = request.username.trim();
    if !USERNAME_CHARS.contains(&username.chars().count())
        || !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Invalid username: 3-30 characters, letters, digits and underscores only".into(),
        ));
    }

    let email = request.email.trim().to_lowercase();
    if email.len() > MAX_EMAIL_CHARS || !valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    if !PASSWORD_CHARS.contains(&request.password.expose_secret().chars().count()) {
        return Err(AppError::Validation(
            "Invalid password: must be between 6 and 128 characters".into(),
        ));
    }

    Ok((username.to_string(), email))
}

fn issue(account: Account, jwt_settings: &JwtSettings) -> Result<AuthResponse, AppError> {
    let token = generate_token(account.id, &account.username, jwt_settings)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;
    Ok(AuthResponse {
        token,
        user: AccountProfile::from(account),
    })
}

pub async fn register<R: AccountRepository>(
    repo: &R,
    jwt_settings: &JwtSettings,
    request: &RegistrationRequest,
) -> Result<AuthResponse, AppError> {
    let (username, email) = validate_registration(request)?;

    let password_hash =
        hash_password_blocking(SecretString::new(request.password.expose_secret().into())).await?;

    let account = repo
        .create(NewAccount {
            username,
            email,
            password_hash,
            join_date: Utc::now(),
        })
        .await?;
    tracing::info!("Registered account {}", account.id);

    issue(account, jwt_settings)
}

pub async fn login<R: AccountRepository>(
    repo: &R,
    jwt_settings: &JwtSettings,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let login = request.username.trim();
    if login.is_empty() || request.password.expose_secret().is_empty() {
        return Err(AppError::Validation("Username and password are required".into()));
    }

    let mut account = match repo.find_by_login(login).await? {
        Some(account) => account,
        None => {
            tracing::info!("User not found or invalid credentials");
            return Err(invalid());
        }
    };

    let password = SecretString::new(request.password.expose_secret().into());
    if !verify_password_blocking(password, account.password_hash.clone()).await? {
        tracing::info!("Invalid password");
        return Err(invalid());
    }

    let now = Utc::now();
    repo.record_login(account.id, now).await?;
    account.last_login = Some(now);

    issue(account, jwt_settings)
}

pub async fn profile<R: AccountRepository>(repo: &R, user_id: Uuid) -> Result<AccountProfile, AppError> {
    repo.find_by_id(user_id)
        .await?
        .map(AccountProfile::from)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::decode_token;
    use crate::db::InMemoryAccountRepository;

    fn jwt() -> JwtSettings {
        JwtSettings::new("unit-secret".into(), 1)
    }

    fn registration(username: &str, email: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest {
            username: username.into(),
            email: email.into(),
            password: SecretString::new(password.into()),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration(&registration("ann_99", "Ann@Example.com", "secret1")).is_ok());
        assert!(validate_registration(&registration("an", "ann@example.com", "secret1")).is_err());
        assert!(validate_registration(&registration("ann smith", "ann@example.com", "secret1")).is_err());
        assert!(validate_registration(&registration("ann", "ann.example.com", "secret1")).is_err());
        assert!(validate_registration(&registration("ann", "a@b@c", "secret1")).is_err());
        assert!(validate_registration(&registration("ann", "ann@example.com", "short")).is_err());

        let (username, email) = validate_registration(&registration(" ann ", " Ann@Example.COM ", "secret1")).unwrap();
        assert_eq!(username, "ann");
        assert_eq!(email, "ann@example.com");
    }

    #[tokio::test]
    async fn register_then_login_updates_last_login() {
        let repo = InMemoryAccountRepository::new();
        let registered = register(&repo, &jwt(), &registration("ann", "ann@example.com", "secret1"))
            .await
            .unwrap();
        assert!(registered.user.last_login.is_none());
        let claims = decode_token(&registered.token, &jwt()).unwrap();
        assert_eq!(claims.user_id(), Some(registered.user.id));

        let logged_in = login(&repo, &jwt(), &login_request("ann@example.com", "secret1")).await.unwrap();
        assert!(logged_in.user.last_login.is_some());

        let me = profile(&repo, registered.user.id).await.unwrap();
        assert_eq!(me.last_login, logged_in.user.last_login);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let repo = InMemoryAccountRepository::new();
        register(&repo, &jwt(), &registration("ann", "ann@example.com", "secret1")).await.unwrap();

        let err = login(&repo, &jwt(), &login_request("ann", "wrong-pass")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        let err = login(&repo, &jwt(), &login_request("bob", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let repo = InMemoryAccountRepository::new();
        register(&repo, &jwt(), &registration("ann", "ann@example.com", "secret1")).await.unwrap();
        let err = register(&repo, &jwt(), &registration("Ann", "other@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn profile_of_missing_account_is_not_found() {
        let repo = InMemoryAccountRepository::new();
        let err = profile(&repo, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
