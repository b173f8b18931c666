//! SQLite repository for players and game sessions.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::stats::{
    DisplayStats, NewStoredSession, NewUser, SessionSummary, StatsError, StoredSession, User,
    schema,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Number of sessions [`StatsRepository::recent_sessions`] returns by default.
pub const DEFAULT_RECENT_LIMIT: i64 = 5;

/// Database repository for player and session operations.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    db_path: String,
}

impl StatsRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, StatsError> {
        if db_path.trim().is_empty() {
            return Err(StatsError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating StatsRepository");
        Ok(Self { db_path })
    }

    /// Opens the database, applying any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StatsError> {
        let repo = Self::new(db_path)?;
        repo.migrate()?;
        Ok(repo)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<(), StatsError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StatsError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StatsError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StatsError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Looks up a player by display name, creating the profile if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_or_create_user(&self, display_name: &str) -> Result<User, StatsError> {
        let mut conn = self.connection()?;

        let existing = schema::users::table
            .filter(schema::users::display_name.eq(display_name))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        if let Some(user) = existing {
            debug!(user_id = user.id(), "User found");
            return Ok(user);
        }

        let user = diesel::insert_into(schema::users::table)
            .values(&NewUser::new(display_name.to_string()))
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), display_name = %user.display_name(), "User created");
        Ok(user)
    }

    /// Records a concluded or abandoned game for a player.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the summary does not fit the schema or a
    /// database error occurs.
    #[instrument(skip(self), fields(moves = summary.moves, won = summary.won))]
    pub fn record_session(
        &self,
        user_id: i32,
        summary: SessionSummary,
    ) -> Result<StoredSession, StatsError> {
        let row = NewStoredSession::from_summary(user_id, summary)?;
        let mut conn = self.connection()?;

        let stored = diesel::insert_into(schema::game_sessions::table)
            .values(&row)
            .returning(StoredSession::as_returning())
            .get_result(&mut conn)?;

        info!(
            session_id = stored.id(),
            user_id = stored.user_id(),
            won = stored.won(),
            "Game session recorded"
        );
        Ok(stored)
    }

    /// The player's most recent sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn recent_sessions(&self, user_id: i32, limit: i64) -> Result<Vec<StoredSession>, StatsError> {
        let mut conn = self.connection()?;

        let sessions = schema::game_sessions::table
            .filter(schema::game_sessions::user_id.eq(user_id))
            .order((
                schema::game_sessions::completed_at.desc(),
                schema::game_sessions::id.desc(),
            ))
            .limit(limit)
            .select(StoredSession::as_select())
            .load(&mut conn)?;

        debug!(user_id, count = sessions.len(), "Recent sessions loaded");
        Ok(sessions)
    }

    /// Dashboard figures over the player's whole history.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn display_stats(&self, user_id: i32) -> Result<DisplayStats, StatsError> {
        let mut conn = self.connection()?;

        let sessions = schema::game_sessions::table
            .filter(schema::game_sessions::user_id.eq(user_id))
            .order((
                schema::game_sessions::completed_at.asc(),
                schema::game_sessions::id.asc(),
            ))
            .select(StoredSession::as_select())
            .load(&mut conn)?;

        let stats = DisplayStats::from_sessions(&sessions);
        info!(
            user_id,
            played = stats.games_played(),
            won = stats.games_won(),
            win_percentage = %format!("{:.1}%", stats.win_percentage()),
            "Display stats computed"
        );
        Ok(stats)
    }
}
