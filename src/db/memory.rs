use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{AccountRepository, RepoResult, ScoreRepository};
use crate::errors::RepositoryError;
use crate::models::score::{GameStats, NewScore, ScoreFilter, ScoreRecord, ScoreSort};
use crate::models::user::{Account, NewAccount};

fn lock<T>(mutex: &Mutex<T>) -> RepoResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| RepositoryError::Poisoned)
}

fn sort_records(records: &mut [ScoreRecord], sort: ScoreSort) {
    match sort {
        ScoreSort::Fastest => records.sort_by(|a, b| {
            a.time
                .cmp(&b.time)
                .then(a.moves.cmp(&b.moves))
                .then(a.created_at.cmp(&b.created_at))
        }),
        ScoreSort::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Process-local score store. Clones share the same records.
#[derive(Clone, Debug, Default)]
pub struct InMemoryScoreRepository {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl InMemoryScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoreRepository for InMemoryScoreRepository {
    async fn insert(&self, score: NewScore) -> RepoResult<ScoreRecord> {
        let record = ScoreRecord {
            id: Uuid::new_v4(),
            player_name: score.player_name,
            user_id: score.user_id,
            category: score.category,
            difficulty: score.difficulty,
            time: score.time,
            moves: score.moves,
            score: score.score,
            created_at: score.created_at,
        };
        lock(&self.records)?.push(record.clone());
        Ok(record)
    }

    async fn find_recent(&self, filter: &ScoreFilter, since: DateTime<Utc>) -> RepoResult<Vec<ScoreRecord>> {
        let mut recent: Vec<ScoreRecord> = lock(&self.records)?
            .iter()
            .filter(|r| r.created_at >= since && filter.matches(r))
            .cloned()
            .collect();
        sort_records(&mut recent, ScoreSort::Newest);
        Ok(recent)
    }

    async fn find_paged(
        &self,
        filter: &ScoreFilter,
        sort: ScoreSort,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ScoreRecord>> {
        let mut matching: Vec<ScoreRecord> = lock(&self.records)?
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_records(&mut matching, sort);
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ScoreFilter) -> RepoResult<i64> {
        let count = lock(&self.records)?.iter().filter(|r| filter.matches(r)).count();
        Ok(count as i64)
    }

    async fn stats(&self) -> RepoResult<GameStats> {
        let records = lock(&self.records)?;

        let players: HashSet<&str> = records.iter().map(|r| r.player_name.as_str()).collect();
        let best_score = records
            .iter()
            .min_by(|a, b| {
                a.time
                    .cmp(&b.time)
                    .then(a.moves.cmp(&b.moves))
                    .then(a.created_at.cmp(&b.created_at))
            })
            .cloned();

        let mut category_counts = GameStats::empty_category_counts();
        for record in records.iter() {
            *category_counts
                .entry(record.category.as_str().to_string())
                .or_insert(0) += 1;
        }

        Ok(GameStats {
            total_games: records.len() as i64,
            total_players: players.len() as i64,
            best_score,
            category_counts,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<Mutex<Vec<Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> RepoResult<Account> {
        let mut accounts = lock(&self.accounts)?;
        let username = account.username.to_lowercase();
        if accounts.iter().any(|a| a.username.to_lowercase() == username) {
            return Err(RepositoryError::UniqueViolation("Username".into()));
        }
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(RepositoryError::UniqueViolation("Email".into()));
        }

        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            join_date: account.join_date,
            last_login: None,
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn find_by_login(&self, login: &str) -> RepoResult<Option<Account>> {
        let login = login.to_lowercase();
        Ok(lock(&self.accounts)?
            .iter()
            .find(|a| a.username.to_lowercase() == login || a.email == login)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Account>> {
        Ok(lock(&self.accounts)?.iter().find(|a| a.id == id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<()> {
        if let Some(account) = lock(&self.accounts)?.iter_mut().find(|a| a.id == id) {
            account.last_login = Some(at);
        }
        Ok(())
    }
}
