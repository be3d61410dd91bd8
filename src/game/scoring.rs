use crate::errors::AppError;
use crate::models::score::{Category, Difficulty, SubmitScoreRequest};

pub const BASE_SCORE: i32 = 1000;
pub const TIME_PENALTY: i32 = 5;
pub const MOVE_PENALTY: i32 = 2;

pub const MIN_TIME: i64 = 1;
pub const MAX_TIME: i64 = 3600;
pub const MIN_MOVES: i64 = 1;
pub const MAX_MOVES: i64 = 1000;
pub const MAX_PLAYER_NAME_CHARS: usize = 50;

/// `max(1000 - (time*5 + moves*2), 0)`
pub fn compute_score(time: i32, moves: i32) -> i32 {
    let penalty = time.saturating_mul(TIME_PENALTY)
        .saturating_add(moves.saturating_mul(MOVE_PENALTY));
    BASE_SCORE.saturating_sub(penalty).max(0)
}

/// A submission that passed every field check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub player_name: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub time: i32,
    pub moves: i32,
}

impl ValidatedSubmission {
    pub fn score(&self) -> i32 {
        compute_score(self.time, self.moves)
    }
}

/// Checks run in a fixed order and the first failure is reported.
pub fn validate_submission(request: &SubmitScoreRequest) -> Result<ValidatedSubmission, AppError> {
    let player_name = request
        .player_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let (player_name, category, difficulty, time, moves) = match (
        player_name,
        request.category.as_deref(),
        request.difficulty.as_deref(),
        request.time,
        request.moves,
    ) {
        (Some(p), Some(c), Some(d), Some(t), Some(m)) => (p, c, d, t, m),
        _ => {
            return Err(AppError::Validation(
                "Missing required fields: playerName, category, difficulty, time, moves".into(),
            ))
        }
    };

    if !(MIN_TIME..=MAX_TIME).contains(&time) {
        return Err(AppError::Validation(format!(
            "Invalid time: must be between {} and {} seconds",
            MIN_TIME, MAX_TIME
        )));
    }

    if !(MIN_MOVES..=MAX_MOVES).contains(&moves) {
        return Err(AppError::Validation(format!(
            "Invalid moves: must be between {} and {}",
            MIN_MOVES, MAX_MOVES
        )));
    }

    let category = category.parse::<Category>().map_err(AppError::Validation)?;
    let difficulty = difficulty.parse::<Difficulty>().map_err(AppError::Validation)?;

    if player_name.chars().count() > MAX_PLAYER_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "Invalid player name: must be between 1 and {} characters",
            MAX_PLAYER_NAME_CHARS
        )));
    }

    Ok(ValidatedSubmission {
        player_name: player_name.to_string(),
        category,
        difficulty,
        // Range checks above keep both values inside i32
        time: time as i32,
        moves: moves as i32,
    })
}
