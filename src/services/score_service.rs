use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::ScoreRepository;
use crate::errors::AppError;
use crate::game::duplicate::DuplicateWindow;
use crate::game::scoring::validate_submission;
use crate::models::common::PagedResponse;
use crate::models::score::{
    Category, Difficulty, GameStats, NewScore, ScoreFilter, ScoreQueryParams, ScoreRecord,
    ScoreSort, SubmitScoreRequest,
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validates a submission and probes for a near-identical recent record.
///
/// The probe and the later insert are separate repository calls, so two
/// concurrent submissions can both pass this check.
pub async fn prepare_submission<R: ScoreRepository>(
    repo: &R,
    window: &DuplicateWindow,
    request: &SubmitScoreRequest,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<NewScore, AppError> {
    let submission = validate_submission(request)?;

    let candidates = repo
        .find_recent(&window.probe_filter(&submission), window.since(now))
        .await?;
    if candidates.iter().any(|existing| window.is_duplicate(&submission, existing, now)) {
        tracing::info!(
            "Rejecting duplicate score for {} ({}/{})",
            submission.player_name, submission.category, submission.difficulty
        );
        return Err(AppError::Conflict("Duplicate score submission detected".into()));
    }

    Ok(NewScore {
        score: submission.score(),
        player_name: submission.player_name,
        user_id,
        category: submission.category,
        difficulty: submission.difficulty,
        time: submission.time,
        moves: submission.moves,
        created_at: now,
    })
}

pub async fn submit_score<R: ScoreRepository>(
    repo: &R,
    window: &DuplicateWindow,
    request: &SubmitScoreRequest,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<ScoreRecord, AppError> {
    let new_score = prepare_submission(repo, window, request, user_id, now).await?;
    let record = repo.insert(new_score).await?;
    tracing::info!("Stored score {} with value {}", record.id, record.score);
    Ok(record)
}

/// Parsed and clamped leaderboard query.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardQuery {
    pub filter: ScoreFilter,
    pub limit: i64,
    pub page: i64,
}

impl LeaderboardQuery {
    /// Rows to skip. Saturates so an out-of-range page yields an empty slice.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

fn parse_enum_filter<T: std::str::FromStr<Err = String>>(raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(AppError::Validation),
    }
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
}

pub fn parse_leaderboard_query(params: &ScoreQueryParams) -> Result<LeaderboardQuery, AppError> {
    let category = parse_enum_filter::<Category>(params.category.as_deref())?;
    let difficulty = parse_enum_filter::<Difficulty>(params.difficulty.as_deref())?;

    let limit = parse_number(params.limit.as_deref())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = parse_number(params.page.as_deref()).unwrap_or(1).max(1);

    Ok(LeaderboardQuery {
        filter: ScoreFilter {
            category,
            difficulty,
            ..Default::default()
        },
        limit,
        page,
    })
}

pub async fn leaderboard<R: ScoreRepository>(
    repo: &R,
    query: &LeaderboardQuery,
) -> Result<PagedResponse<ScoreRecord>, AppError> {
    let records = repo
        .find_paged(&query.filter, ScoreSort::Fastest, query.limit, query.offset())
        .await?;
    let total_count = repo.count(&query.filter).await?;
    Ok(PagedResponse::new(records, total_count, query.page, query.limit))
}

pub async fn game_stats<R: ScoreRepository>(repo: &R) -> Result<GameStats, AppError> {
    Ok(repo.stats().await?)
}
