use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::{RepoResult, ScoreRepository};
use crate::models::score::{GameStats, NewScore, ScoreFilter, ScoreRecord, ScoreSort};

const SCORE_COLUMNS: &str =
    "id, player_name, user_id, category, difficulty, time_seconds, moves, score, created_at";

#[derive(Clone, Debug)]
pub struct PgScoreRepository {
    pool: PgPool,
}

impl PgScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a ScoreFilter) {
    builder.push(" WHERE 1=1");
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(difficulty) = &filter.difficulty {
        builder.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(player_name) = &filter.player_name {
        builder
            .push(" AND lower(player_name) = lower(")
            .push_bind(player_name.as_str())
            .push(")");
    }
}

fn order_clause(sort: ScoreSort) -> &'static str {
    match sort {
        ScoreSort::Fastest => " ORDER BY time_seconds ASC, moves ASC, created_at ASC",
        ScoreSort::Newest => " ORDER BY created_at DESC",
    }
}

impl ScoreRepository for PgScoreRepository {
    #[tracing::instrument(
        name = "Insert score",
        skip(self, score),
        fields(
            player_name = %score.player_name,
            category = %score.category,
            difficulty = %score.difficulty
        )
    )]
    async fn insert(&self, score: NewScore) -> RepoResult<ScoreRecord> {
        let record = sqlx::query_as::<_, ScoreRecord>(&format!(
            r#"
            INSERT INTO scores (id, player_name, user_id, category, difficulty, time_seconds, moves, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SCORE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&score.player_name)
        .bind(score.user_id)
        .bind(score.category.as_str())
        .bind(score.difficulty.as_str())
        .bind(score.time)
        .bind(score.moves)
        .bind(score.score)
        .bind(score.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute score insert query: {:?}", e);
            e
        })?;

        Ok(record)
    }

    async fn find_recent(&self, filter: &ScoreFilter, since: DateTime<Utc>) -> RepoResult<Vec<ScoreRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM scores", SCORE_COLUMNS));
        push_filter(&mut builder, filter);
        builder.push(" AND created_at >= ").push_bind(since);
        builder.push(order_clause(ScoreSort::Newest));

        let records = builder
            .build_query_as::<ScoreRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_paged(
        &self,
        filter: &ScoreFilter,
        sort: ScoreSort,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ScoreRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM scores", SCORE_COLUMNS));
        push_filter(&mut builder, filter);
        builder.push(order_clause(sort));
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let records = builder
            .build_query_as::<ScoreRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn count(&self, filter: &ScoreFilter) -> RepoResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM scores");
        push_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[tracing::instrument(name = "Aggregate score stats", skip(self))]
    async fn stats(&self) -> RepoResult<GameStats> {
        let (total_games, total_players): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT player_name) FROM scores",
        )
        .fetch_one(&self.pool)
        .await?;

        let best_score = sqlx::query_as::<_, ScoreRecord>(&format!(
            "SELECT {} FROM scores{} LIMIT 1",
            SCORE_COLUMNS,
            order_clause(ScoreSort::Fastest)
        ))
        .fetch_optional(&self.pool)
        .await?;

        let per_category: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM scores GROUP BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut category_counts = GameStats::empty_category_counts();
        for (category, count) in per_category {
            category_counts.insert(category, count);
        }

        Ok(GameStats {
            total_games,
            total_players,
            best_score,
            category_counts,
        })
    }
}
