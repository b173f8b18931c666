//! Game statistics: SQLite persistence and the reporting seam.

mod error;
mod models;
mod reporter;
mod repository;
mod schema;

pub use error::StatsError;
pub use models::{
    DisplayStats, NewStoredSession, NewUser, SessionSummary, StoredSession, User, format_duration,
};
pub use reporter::{ChannelReporter, RecordingReporter, RepositoryReporter, StatsReporter};
pub use repository::{DEFAULT_RECENT_LIMIT, StatsRepository};
