use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{AccountRepository, RepoResult};
use crate::errors::RepositoryError;
use crate::models::user::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, join_date, last_login";

#[derive(Clone, Debug)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turns a unique index clash into a `UniqueViolation` naming the field.
fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(name) if name.contains("email") => "Email",
                _ => "Username",
            };
            return RepositoryError::UniqueViolation(field.to_string());
        }
    }
    RepositoryError::Database(err)
}

impl AccountRepository for PgAccountRepository {
    #[tracing::instrument(
        name = "Insert account",
        skip(self, account),
        fields(
            username = %account.username
        )
    )]
    async fn create(&self, account: NewAccount) -> RepoResult<Account> {
        sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, join_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.join_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to execute user insert query: {:?}", e);
            map_unique_violation(e)
        })
    }

    async fn find_by_login(&self, login: &str) -> RepoResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE lower(username) = lower($1) OR email = lower($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
