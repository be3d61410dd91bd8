use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Category {
    Heroes,
    Movies,
    Musicians,
    Videogames,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Heroes,
        Category::Movies,
        Category::Musicians,
        Category::Videogames,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Heroes => "heroes",
            Category::Movies => "movies",
            Category::Musicians => "musicians",
            Category::Videogames => "videogames",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Category::Heroes => "Heroes",
            Category::Movies => "Movies",
            Category::Musicians => "Musicians",
            Category::Videogames => "Video Games",
        }
    }

    /// Comma separated identifiers, used in validation messages.
    pub fn valid_values() -> String {
        Self::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Invalid category. Valid categories: {}", Self::valid_values()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Number of card pairs on the board.
    pub const fn pairs(&self) -> u8 {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Medium => 8,
            Difficulty::Hard => 12,
        }
    }

    pub fn valid_values() -> String {
        Self::ALL.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("Invalid difficulty. Valid difficulties: {}", Self::valid_values()))
    }
}

/// One persisted game result. Never mutated after insert.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: Uuid,
    pub player_name: String,
    pub user_id: Option<Uuid>,
    pub category: Category,
    pub difficulty: Difficulty,
    #[sqlx(rename = "time_seconds")]
    pub time: i32,
    pub moves: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

/// A validated score about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub player_name: String,
    pub user_id: Option<Uuid>,
    pub category: Category,
    pub difficulty: Difficulty,
    pub time: i32,
    pub moves: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

/// Raw submission body. Every field is optional so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    pub player_name: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub time: Option<i64>,
    pub moves: Option<i64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreQueryParams {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub user_id: Option<Uuid>,
    /// Compared case-insensitively.
    pub player_name: Option<String>,
}

impl ScoreFilter {
    pub fn matches(&self, record: &ScoreRecord) -> bool {
        self.category.map_or(true, |c| c == record.category)
            && self.difficulty.map_or(true, |d| d == record.difficulty)
            && self.user_id.map_or(true, |id| record.user_id == Some(id))
            && self
                .player_name
                .as_ref()
                .map_or(true, |name| name.to_lowercase() == record.player_name.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreSort {
    /// time asc, moves asc, created_at asc
    #[default]
    Fastest,
    Newest,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_games: i64,
    pub total_players: i64,
    pub best_score: Option<ScoreRecord>,
    pub category_counts: BTreeMap<String, i64>,
}

impl GameStats {
    /// Counts keyed by every known category, zero-filled.
    pub fn empty_category_counts() -> BTreeMap<String, i64> {
        Category::ALL.iter().map(|c| (c.as_str().to_string(), 0)).collect()
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct CategoryInfo {
    pub id: Category,
    pub name: &'static str,
}

#[derive(Debug, Serialize, Clone)]
pub struct DifficultyInfo {
    pub id: Difficulty,
    pub name: &'static str,
    pub pairs: u8,
}
