//! Strictly Solitaire - Freecell with paced auto-complete and statistics.
//!
//! The rules live in [`strictly_freecell`]; this crate wraps them in a
//! playable session.
//!
//! # Architecture
//!
//! - **Session**: synchronous state machine over the live board
//! - **Driver**: tokio actor that paces auto-complete steps
//! - **Stats**: SQLite persistence (diesel) behind the `StatsReporter` seam
//! - **Identity**: who, if anyone, is signed in
//! - **Config**: TOML settings
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_solitaire::{
//!     AutoCompletePacing, GameSession, RecordingReporter, SessionCommand, SessionDriver,
//!     SessionEvent, StaticIdentity,
//! };
//! use strictly_freecell::SequenceRule;
//!
//! # async fn example() {
//! let session = GameSession::new(
//!     SequenceRule::Capacity,
//!     Arc::new(StaticIdentity::anonymous()),
//!     Arc::new(RecordingReporter::new()),
//! );
//! let mut driver = SessionDriver::spawn(session, AutoCompletePacing::default());
//! driver.send(SessionCommand::DiagnosticGame);
//! while let Some(event) = driver.next_event().await {
//!     if let SessionEvent::Won { moves } = event {
//!         println!("won in {moves} moves");
//!         break;
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod driver;
mod identity;
mod session;
pub mod stats;

// Crate-level exports - Configuration
pub use config::{ConfigError, FreecellConfig};

// Crate-level exports - Session
pub use session::{
    AutoCompleteHighlight, ClickOutcome, GameSession, Location, RenderView, SessionError,
    SessionPhase, StepOutcome,
};

// Crate-level exports - Driver
pub use driver::{
    AutoCompletePacing, AutoCompleteTimer, DriverHandle, SessionCommand, SessionDriver,
    SessionEvent,
};

// Crate-level exports - Identity
pub use identity::{IdentityError, IdentityProvider, StaticIdentity};

// Crate-level exports - Statistics
pub use stats::{
    ChannelReporter, DEFAULT_RECENT_LIMIT, DisplayStats, RecordingReporter, RepositoryReporter,
    SessionSummary, StatsError, StatsReporter, StatsRepository, StoredSession, User,
    format_duration,
};
