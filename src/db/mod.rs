//! Persistence seams.
//!
//! Handlers and services only talk to these traits. `Pg*` types back them
//! with Postgres; `InMemory*` types keep everything in process and are what
//! the test suite spawns the server with.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::RepositoryError;
use crate::models::score::{GameStats, NewScore, ScoreFilter, ScoreRecord, ScoreSort};
use crate::models::user::{Account, NewAccount};

pub mod account_queries;
pub mod memory;
pub mod score_queries;

pub use account_queries::PgAccountRepository;
pub use memory::{InMemoryAccountRepository, InMemoryScoreRepository};
pub use score_queries::PgScoreRepository;

pub type RepoResult<T> = Result<T, RepositoryError>;

#[allow(async_fn_in_trait)]
pub trait ScoreRepository: Clone + Send + Sync + 'static {
    async fn insert(&self, score: NewScore) -> RepoResult<ScoreRecord>;

    /// Records matching `filter` created at or after `since`.
    async fn find_recent(&self, filter: &ScoreFilter, since: DateTime<Utc>) -> RepoResult<Vec<ScoreRecord>>;

    async fn find_paged(
        &self,
        filter: &ScoreFilter,
        sort: ScoreSort,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ScoreRecord>>;

    async fn count(&self, filter: &ScoreFilter) -> RepoResult<i64>;

    async fn stats(&self) -> RepoResult<GameStats>;
}

#[allow(async_fn_in_trait)]
pub trait AccountRepository: Clone + Send + Sync + 'static {
    /// Fails with `RepositoryError::UniqueViolation` when the username or
    /// email is taken.
    async fn create(&self, account: NewAccount) -> RepoResult<Account>;

    /// Looks the account up by username (case-insensitive) or email.
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Account>>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()>;
}
