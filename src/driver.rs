//! Async driver that owns a [`GameSession`] and paces auto-complete.
//!
//! The driver is an actor: commands arrive on an mpsc channel, events leave
//! on another. Auto-complete steps are scheduled one at a time on an
//! [`AutoCompleteTimer`]; starting a new game or shutting down drops the
//! timer, which aborts the pending step. Each tick carries the game
//! generation it was scheduled for, so a tick that slips through after a
//! new deal is ignored.

use std::time::Duration;

use strictly_freecell::{AutoMove, Move};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::session::{ClickOutcome, GameSession, Location, RenderView, SessionPhase};

/// Delays that pace auto-complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCompletePacing {
    start_delay: Duration,
    step_delay: Duration,
}

impl AutoCompletePacing {
    /// Creates pacing with a delay before the first step and between steps.
    pub fn new(start_delay: Duration, step_delay: Duration) -> Self {
        Self {
            start_delay,
            step_delay,
        }
    }

    /// Delay before the first step.
    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }

    /// Delay between steps.
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }
}

impl Default for AutoCompletePacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(800))
    }
}

/// Requests sent to the driver.
#[derive(Debug)]
pub enum SessionCommand {
    /// Abandon the current game and deal a new one.
    NewGame {
        /// Fixed deal seed.
        seed: Option<u64>,
    },
    /// Abandon the current game and load the near-won fixture.
    DiagnosticGame,
    /// Apply a player move.
    Move(Move),
    /// Select-then-target click.
    Click(Location),
    /// Drop the current selection.
    ClearSelection,
    /// Ask for a hint.
    Hint,
    /// Abandon the current game.
    Abandon,
    /// Reply with the current view.
    Snapshot(oneshot::Sender<RenderView>),
    /// Stop the driver.
    Shutdown,
}

/// Notifications published by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The board or selection changed.
    StateChanged(RenderView),
    /// A request was refused; the state is unchanged.
    Rejected(String),
    /// Auto-complete engaged.
    AutoCompleteStarted,
    /// One auto-complete step was applied.
    AutoCompleteStep(AutoMove),
    /// The game was won.
    Won {
        /// Total moves, auto-complete steps included.
        moves: u32,
    },
    /// Suggested move, if any.
    Hint(Option<Move>),
    /// The driver stopped.
    Stopped,
}

/// A pending auto-complete tick. Dropping the guard aborts it.
#[derive(Debug)]
pub struct AutoCompleteTimer {
    handle: JoinHandle<()>,
    generation: u64,
}

impl AutoCompleteTimer {
    /// Schedules a tick for `generation` after `delay`.
    #[instrument(skip(ticks))]
    fn schedule(delay: Duration, generation: u64, ticks: mpsc::UnboundedSender<u64>) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = ticks.send(generation);
        });
        Self { handle, generation }
    }
}

impl Drop for AutoCompleteTimer {
    fn drop(&mut self) {
        debug!(generation = self.generation, "Cancelling pending auto-complete tick");
        self.handle.abort();
    }
}

/// Client side of a running driver.
#[derive(Debug)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Sends a command. Returns `false` if the driver has stopped.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Waits for the next event; `None` once the driver has stopped.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Current view, or `None` if the driver has stopped.
    pub async fn snapshot(&self) -> Option<RenderView> {
        let (tx, rx) = oneshot::channel();
        if !self.send(SessionCommand::Snapshot(tx)) {
            return None;
        }
        rx.await.ok()
    }

    /// Stops the driver and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns the join error if the driver task panicked.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        let _ = self.commands.send(SessionCommand::Shutdown);
        self.task.await
    }
}

/// Actor owning the session and its auto-complete timer.
pub struct SessionDriver {
    session: GameSession,
    pacing: AutoCompletePacing,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    ticks_tx: mpsc::UnboundedSender<u64>,
    ticks_rx: mpsc::UnboundedReceiver<u64>,
    timer: Option<AutoCompleteTimer>,
}

impl SessionDriver {
    /// Spawns the driver on the current tokio runtime.
    #[instrument(skip(session))]
    pub fn spawn(session: GameSession, pacing: AutoCompletePacing) -> DriverHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();

        let driver = Self {
            session,
            pacing,
            commands: commands_rx,
            events: events_tx,
            ticks_tx,
            ticks_rx,
            timer: None,
        };
        let task = tokio::spawn(driver.run());

        DriverHandle {
            commands: commands_tx,
            events: events_rx,
            task,
        }
    }

    /// Runs until shutdown or until every command sender is gone.
    async fn run(mut self) {
        info!("Session driver started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(generation) = self.ticks_rx.recv() => self.on_tick(generation),
            }
        }

        self.timer = None;
        self.emit(SessionEvent::Stopped);
        info!("Session driver stopped");
    }

    #[instrument(skip(self), fields(phase = %self.session.phase()))]
    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::NewGame { seed } => {
                self.timer = None;
                let phase = self.session.new_game(seed);
                self.after_change(phase);
            }
            SessionCommand::DiagnosticGame => {
                self.timer = None;
                let phase = self.session.new_diagnostic_game();
                self.after_change(phase);
            }
            SessionCommand::Move(action) => match self.session.request_move(action) {
                Ok(phase) => self.after_change(phase),
                Err(e) => self.emit(SessionEvent::Rejected(e.to_string())),
            },
            SessionCommand::Click(location) => match self.session.click(location) {
                Ok(ClickOutcome::Moved(phase)) => self.after_change(phase),
                Ok(ClickOutcome::Selected(_)) => self.publish_state(),
                Ok(ClickOutcome::Ignored) => {}
                Err(e) => {
                    self.emit(SessionEvent::Rejected(e.to_string()));
                    self.publish_state();
                }
            },
            SessionCommand::ClearSelection => {
                self.session.clear_selection();
                self.publish_state();
            }
            SessionCommand::Hint => self.emit(SessionEvent::Hint(self.session.hint())),
            SessionCommand::Abandon => {
                self.timer = None;
                self.session.abandon();
                self.publish_state();
            }
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.session.view());
            }
            SessionCommand::Shutdown => {}
        }
    }

    /// Applies one paced step if the tick still belongs to this game.
    #[instrument(skip(self))]
    fn on_tick(&mut self, generation: u64) {
        self.timer = None;
        if generation != self.session.generation() || !self.session.phase().is_auto_completing() {
            debug!(current = self.session.generation(), "Ignoring stale tick");
            return;
        }

        match self.session.step_auto_complete() {
            Ok(Some(outcome)) => {
                self.emit(SessionEvent::AutoCompleteStep(outcome.step));
                self.publish_state();
                match outcome.phase {
                    SessionPhase::AutoCompleting => self.schedule(self.pacing.step_delay()),
                    SessionPhase::Won => self.announce_win(),
                    _ => {}
                }
            }
            Ok(None) => self.publish_state(),
            Err(e) => {
                warn!(error = %e, "Auto-complete step failed");
                self.emit(SessionEvent::Rejected(e.to_string()));
                self.publish_state();
            }
        }
    }

    fn after_change(&mut self, phase: SessionPhase) {
        self.publish_state();
        match phase {
            SessionPhase::AutoCompleting => {
                self.emit(SessionEvent::AutoCompleteStarted);
                self.schedule(self.pacing.start_delay());
            }
            SessionPhase::Won => self.announce_win(),
            SessionPhase::Idle | SessionPhase::Playing => {}
        }
    }

    fn announce_win(&mut self) {
        let moves = self.session.board().map(|b| b.moves()).unwrap_or(0);
        self.emit(SessionEvent::Won { moves });
    }

    fn schedule(&mut self, delay: Duration) {
        let generation = self.session.generation();
        self.timer = Some(AutoCompleteTimer::schedule(
            delay,
            generation,
            self.ticks_tx.clone(),
        ));
    }

    fn publish_state(&self) {
        self.emit(SessionEvent::StateChanged(self.session.view()));
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("No event listener");
        }
    }
}
