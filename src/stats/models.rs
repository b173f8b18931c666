//! Statistics models and derived display figures.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::stats::{StatsError, schema};

/// Player profile database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    display_name: String,
    created_at: NaiveDateTime,
}

/// Insertable user model for creating new players.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    display_name: String,
}

/// A finished or abandoned game as stored.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::game_sessions)]
#[diesel(belongs_to(User))]
pub struct StoredSession {
    id: i32,
    user_id: i32,
    moves: i32,
    time_seconds: i32,
    won: bool,
    completed_at: NaiveDateTime,
}

/// Insertable game session row.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::game_sessions)]
pub struct NewStoredSession {
    user_id: i32,
    moves: i32,
    time_seconds: i32,
    won: bool,
    completed_at: NaiveDateTime,
}

impl NewStoredSession {
    /// Builds a row for `user_id` from a session summary, stamped now.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the counters do not fit the storage columns.
    #[instrument]
    pub fn from_summary(user_id: i32, summary: SessionSummary) -> Result<Self, StatsError> {
        let moves = i32::try_from(summary.moves)
            .map_err(|_| StatsError::new(format!("Move count {} out of range", summary.moves)))?;
        let time_seconds = i32::try_from(summary.elapsed_seconds).map_err(|_| {
            StatsError::new(format!(
                "Elapsed time {}s out of range",
                summary.elapsed_seconds
            ))
        })?;
        Ok(Self {
            user_id,
            moves,
            time_seconds,
            won: summary.won,
            completed_at: chrono::Utc::now().naive_utc(),
        })
    }
}

/// What the session reports when a game concludes or is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct SessionSummary {
    /// Moves made, auto-complete steps included.
    pub moves: u32,
    /// Seconds since the deal.
    pub elapsed_seconds: u64,
    /// Whether the game was won.
    pub won: bool,
}

/// Aggregate figures shown on the player's dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct DisplayStats {
    games_played: u32,
    games_won: u32,
    win_percentage: f64,
    average_moves: u32,
    best_time: Option<u32>,
    current_streak: u32,
    longest_streak: u32,
}

impl DisplayStats {
    /// Derives the dashboard figures from sessions in chronological order.
    ///
    /// Win percentage is rounded to one decimal, average moves to the
    /// nearest whole move. Best time is the fastest won game.
    #[instrument(skip(sessions), fields(count = sessions.len()))]
    pub fn from_sessions(sessions: &[StoredSession]) -> Self {
        let games_played = sessions.len() as u32;
        if games_played == 0 {
            return Self::default();
        }

        let games_won = sessions.iter().filter(|s| s.won).count() as u32;
        let total_moves: i64 = sessions.iter().map(|s| i64::from(s.moves)).sum();

        let mut current_streak = 0;
        let mut longest_streak = 0;
        for session in sessions {
            if session.won {
                current_streak += 1;
                longest_streak = longest_streak.max(current_streak);
            } else {
                current_streak = 0;
            }
        }

        Self {
            games_played,
            games_won,
            win_percentage: (f64::from(games_won) / f64::from(games_played) * 1000.0).round()
                / 10.0,
            average_moves: (total_moves as f64 / f64::from(games_played)).round() as u32,
            best_time: sessions
                .iter()
                .filter(|s| s.won)
                .map(|s| s.time_seconds.max(0) as u32)
                .min(),
            current_streak,
            longest_streak,
        }
    }
}

/// Formats seconds as `m:ss`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
