use chrono::{DateTime, Duration, Utc};

use crate::game::scoring::ValidatedSubmission;
use crate::models::score::{ScoreFilter, ScoreRecord};

/// Tolerance band inside which a new submission counts as a resubmission of
/// a score that was just stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateWindow {
    pub window_seconds: i64,
    pub time_tolerance: i32,
    pub moves_tolerance: i32,
}

pub const DUPLICATE_WINDOW: DuplicateWindow = DuplicateWindow {
    window_seconds: 10,
    time_tolerance: 5,
    moves_tolerance: 2,
};

impl DuplicateWindow {
    /// Oldest `created_at` still inside the window.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::seconds(self.window_seconds)
    }

    /// Repository filter narrowing candidates to the same player, category
    /// and difficulty.
    pub fn probe_filter(&self, submission: &ValidatedSubmission) -> ScoreFilter {
        ScoreFilter {
            category: Some(submission.category),
            difficulty: Some(submission.difficulty),
            user_id: None,
            player_name: Some(submission.player_name.clone()),
        }
    }

    pub fn is_duplicate(
        &self,
        submission: &ValidatedSubmission,
        existing: &ScoreRecord,
        now: DateTime<Utc>,
    ) -> bool {
        existing.created_at >= self.since(now)
            && existing.category == submission.category
            && existing.difficulty == submission.difficulty
            && existing.player_name.to_lowercase() == submission.player_name.to_lowercase()
            && (existing.time - submission.time).abs() <= self.time_tolerance
            && (existing.moves - submission.moves).abs() <= self.moves_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::score::{Category, Difficulty};
    use uuid::Uuid;

    fn submission(time: i32, moves: i32) -> ValidatedSubmission {
        ValidatedSubmission {
            player_name: "Ann".into(),
            category: Category::Heroes,
            difficulty: Difficulty::Easy,
            time,
            moves,
        }
    }

    fn stored(name: &str, time: i32, moves: i32, created_at: DateTime<Utc>) -> ScoreRecord {
        ScoreRecord {
            id: Uuid::new_v4(),
            player_name: name.into(),
            user_id: None,
            category: Category::Heroes,
            difficulty: Difficulty::Easy,
            time,
            moves,
            score: 0,
            created_at,
        }
    }

    #[test]
    fn test_within_tolerance_is_duplicate() {
        let now = Utc::now();
        let window = DUPLICATE_WINDOW;
        let sub = submission(50, 20);
        assert!(window.is_duplicate(&sub, &stored("ann", 55, 22, now - Duration::seconds(3)), now));
        assert!(window.is_duplicate(&sub, &stored("ANN", 45, 18, now - Duration::seconds(10)), now));
    }

    #[test]
    fn test_outside_tolerance_is_not_duplicate() {
        let now = Utc::now();
        let window = DUPLICATE_WINDOW;
        let sub = submission(50, 20);
        assert!(!window.is_duplicate(&sub, &stored("Ann", 56, 20, now), now));
        assert!(!window.is_duplicate(&sub, &stored("Ann", 50, 23, now), now));
        assert!(!window.is_duplicate(&sub, &stored("Ann", 50, 20, now - Duration::seconds(11)), now));
        assert!(!window.is_duplicate(&sub, &stored("Anne", 50, 20, now), now));
    }

    #[test]
    fn test_other_board_is_not_duplicate() {
        let now = Utc::now();
        let mut other = stored("Ann", 50, 20, now);
        other.difficulty = Difficulty::Hard;
        assert!(!DUPLICATE_WINDOW.is_duplicate(&submission(50, 20), &other, now));
    }

    #[test]
    fn test_probe_filter_targets_same_board() {
        let filter = DUPLICATE_WINDOW.probe_filter(&submission(50, 20));
        assert_eq!(filter.category, Some(Category::Heroes));
        assert_eq!(filter.difficulty, Some(Difficulty::Easy));
        assert_eq!(filter.player_name.as_deref(), Some("Ann"));
        assert_eq!(filter.user_id, None);
    }
}
