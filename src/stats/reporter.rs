//! The statistics collaborator seam.
//!
//! The session hands a [`SessionSummary`] to a [`StatsReporter`] exactly once
//! per concluded or abandoned game. Reporting is fire-and-forget: failures
//! are logged by the caller and never reach game state.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::identity::IdentityProvider;
use crate::stats::{SessionSummary, StatsError, StatsRepository};

/// Accepts session summaries.
pub trait StatsReporter: Send + Sync {
    /// Records one concluded or abandoned game.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the summary could not be accepted.
    fn record_session(&self, summary: SessionSummary) -> Result<(), StatsError>;
}

/// Writes summaries to the SQLite repository under the current player.
pub struct RepositoryReporter {
    repo: StatsRepository,
    identity: Arc<dyn IdentityProvider>,
}

impl RepositoryReporter {
    /// Creates a reporter writing through `repo` for whoever `identity`
    /// names.
    pub fn new(repo: StatsRepository, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { repo, identity }
    }
}

impl StatsReporter for RepositoryReporter {
    #[instrument(skip(self))]
    fn record_session(&self, summary: SessionSummary) -> Result<(), StatsError> {
        let player = self
            .identity
            .current_user()
            .map_err(|e| StatsError::new(format!("Identity lookup failed: {}", e)))?;

        let Some(name) = player else {
            debug!("No player signed in, session not recorded");
            return Ok(());
        };

        let user = self.repo.get_or_create_user(&name)?;
        self.repo.record_session(*user.id(), summary)?;
        Ok(())
    }
}

/// Forwards summaries to a background task so the caller never blocks on
/// storage.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<SessionSummary>,
}

impl ChannelReporter {
    /// Spawns the writer task around `inner` and returns the sending half.
    ///
    /// The task ends once every clone of the reporter has been dropped.
    /// Must be called from within a tokio runtime.
    #[instrument(skip(inner))]
    pub fn spawn(inner: Arc<dyn StatsReporter>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionSummary>();

        let handle = tokio::spawn(async move {
            info!("Stats writer started");
            while let Some(summary) = rx.recv().await {
                let inner = Arc::clone(&inner);
                match tokio::task::spawn_blocking(move || inner.record_session(summary)).await {
                    Ok(Ok(())) => debug!(?summary, "Session reported"),
                    Ok(Err(e)) => warn!(error = %e, "Failed to record session"),
                    Err(e) => warn!(error = %e, "Stats writer task failed"),
                }
            }
            info!("Stats writer stopped");
        });

        (Self { tx }, handle)
    }
}

impl StatsReporter for ChannelReporter {
    fn record_session(&self, summary: SessionSummary) -> Result<(), StatsError> {
        self.tx
            .send(summary)
            .map_err(|_| StatsError::new("Stats writer has stopped"))
    }
}

/// Keeps summaries in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    records: Mutex<Vec<SessionSummary>>,
}

impl RecordingReporter {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn records(&self) -> Vec<SessionSummary> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl StatsReporter for RecordingReporter {
    fn record_session(&self, summary: SessionSummary) -> Result<(), StatsError> {
        self.records
            .lock()
            .map_err(|_| StatsError::new("Recorder lock poisoned"))?
            .push(summary);
        Ok(())
    }
}
