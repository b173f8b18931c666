//! Single-player game session.
//!
//! [`GameSession`] owns the current board and moves it through
//! `Idle → Playing → AutoCompleting → Won`. Every change replaces the whole
//! snapshot; a rejected request leaves it untouched. The session is
//! synchronous: pacing of auto-complete steps belongs to
//! [`SessionDriver`](crate::SessionDriver).

use std::sync::Arc;

use chrono::Utc;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strictly_freecell::{
    AutoMove, BoardState, Destination, Move, MoveError, SequenceRule, Source, apply_move_with,
    can_auto_complete, initialize_game, initialize_game_with_seed, legal_moves, near_won_fixture,
    next_auto_complete_move,
};
use strum::{Display as StrumDisplay, EnumIs};
use tracing::{debug, info, instrument, warn};

use crate::identity::IdentityProvider;
use crate::stats::{SessionSummary, StatsReporter};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumIs)]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    /// No game dealt.
    Idle,
    /// Accepting player moves.
    Playing,
    /// Retiring cards automatically; player input is refused.
    AutoCompleting,
    /// Every foundation is full.
    Won,
}

/// A clickable spot on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Location {
    /// A free cell.
    FreeCell {
        /// Cell index.
        index: usize,
    },
    /// A foundation pile.
    Foundation {
        /// Foundation index.
        index: usize,
    },
    /// A card in a tableau column (or the empty column itself).
    Tableau {
        /// Column index.
        column: usize,
        /// Card index within the column.
        index: usize,
    },
}

impl Location {
    /// The destination a click here names once something is selected.
    pub fn as_destination(self) -> Destination {
        match self {
            Location::FreeCell { index } => Destination::FreeCell(index),
            Location::Foundation { index } => Destination::Foundation(index),
            Location::Tableau { column, .. } => Destination::Tableau(column),
        }
    }
}

/// Source and destination of the step just taken during auto-complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCompleteHighlight {
    /// Where the card came from.
    pub source: Source,
    /// The foundation it went to.
    pub destination: Destination,
}

impl From<AutoMove> for AutoCompleteHighlight {
    fn from(step: AutoMove) -> Self {
        Self {
            source: step.source,
            destination: step.destination(),
        }
    }
}

/// Read-only snapshot for the render collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderView {
    /// Current board, absent while idle.
    pub board: Option<BoardState>,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Currently selected source, if any.
    pub selection: Option<Source>,
    /// Emphasis for the latest auto-complete step.
    pub highlight: Option<AutoCompleteHighlight>,
    /// Game counter; bumps on every deal.
    pub generation: u64,
}

/// Why the session refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionError {
    /// The executor rejected the move.
    #[display("Move rejected: {}", _0)]
    MoveRejected(MoveError),

    /// Input is disabled while auto-complete runs.
    #[display("Auto-complete in progress")]
    AutoCompleting,

    /// No game has been dealt.
    #[display("No game in progress")]
    NoGame,
}

impl std::error::Error for SessionError {}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        Self::MoveRejected(err)
    }
}

/// Result of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// The click selected a source.
    Selected(Source),
    /// Nothing to select there.
    Ignored,
    /// The selected source was moved; the session is now in this phase.
    Moved(SessionPhase),
}

/// Result of one auto-complete step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// The retirement applied.
    pub step: AutoMove,
    /// Phase after the step.
    pub phase: SessionPhase,
}

/// Owns the live board and its lifecycle.
pub struct GameSession {
    board: Option<BoardState>,
    phase: SessionPhase,
    selection: Option<Source>,
    highlight: Option<AutoCompleteHighlight>,
    generation: u64,
    reported: bool,
    rule: SequenceRule,
    identity: Arc<dyn IdentityProvider>,
    reporter: Arc<dyn StatsReporter>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("moves", &self.board.as_ref().map(BoardState::moves))
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Creates an idle session.
    pub fn new(
        rule: SequenceRule,
        identity: Arc<dyn IdentityProvider>,
        reporter: Arc<dyn StatsReporter>,
    ) -> Self {
        Self {
            board: None,
            phase: SessionPhase::Idle,
            selection: None,
            highlight: None,
            generation: 0,
            reported: false,
            rule,
            identity,
            reporter,
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Current board, if dealt.
    pub fn board(&self) -> Option<&BoardState> {
        self.board.as_ref()
    }

    /// Game counter; bumps on every deal.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current selection.
    pub fn selection(&self) -> Option<Source> {
        self.selection
    }

    /// Sequence rule in force.
    pub fn rule(&self) -> SequenceRule {
        self.rule
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> RenderView {
        RenderView {
            board: self.board.clone(),
            phase: self.phase,
            selection: self.selection,
            highlight: self.highlight,
            generation: self.generation,
        }
    }

    /// A move worth trying: a safe retirement if one exists, else the first
    /// legal move.
    pub fn hint(&self) -> Option<Move> {
        let board = self.board.as_ref()?;
        if !self.phase.is_playing() {
            return None;
        }
        next_auto_complete_move(board)
            .map(|step| step.as_move())
            .or_else(|| legal_moves(board, self.rule).into_iter().next())
    }

    // ─────────────────────────────────────────────────────────────
    //  Lifecycle
    // ─────────────────────────────────────────────────────────────

    /// Abandons any game in progress and deals a fresh one.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn new_game(&mut self, seed: Option<u64>) -> SessionPhase {
        let board = match seed {
            Some(seed) => initialize_game_with_seed(seed),
            None => initialize_game(),
        };
        self.start(board)
    }

    /// Abandons any game in progress and loads the near-won fixture.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn new_diagnostic_game(&mut self) -> SessionPhase {
        self.start(near_won_fixture())
    }

    /// Discards the current game, reporting it as a loss if any move was
    /// made. The session returns to idle.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn abandon(&mut self) {
        self.report_abandoned();
        self.board = None;
        self.phase = SessionPhase::Idle;
        self.selection = None;
        self.highlight = None;
        info!("Session idle");
    }

    fn start(&mut self, board: BoardState) -> SessionPhase {
        self.report_abandoned();
        self.generation += 1;
        self.board = Some(board);
        self.phase = SessionPhase::Playing;
        self.selection = None;
        self.highlight = None;
        self.reported = false;
        info!(generation = self.generation, "New game dealt");
        self.settle()
    }

    // ─────────────────────────────────────────────────────────────
    //  Player input
    // ─────────────────────────────────────────────────────────────

    /// Applies a player move.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoGame`] when idle,
    /// [`SessionError::AutoCompleting`] while auto-complete runs, and
    /// [`SessionError::MoveRejected`] when the executor refuses the move.
    #[instrument(skip(self), fields(action = %action, phase = %self.phase))]
    pub fn request_move(&mut self, action: Move) -> Result<SessionPhase, SessionError> {
        let board = self.board.as_ref().ok_or(SessionError::NoGame)?;
        if self.phase.is_auto_completing() {
            debug!("Move refused during auto-complete");
            return Err(SessionError::AutoCompleting);
        }

        let next = apply_move_with(board, action, self.rule).inspect_err(|e| {
            debug!(error = %e, "Move rejected");
        })?;
        self.board = Some(next);
        self.selection = None;
        Ok(self.settle())
    }

    /// Select-then-target click protocol.
    ///
    /// With nothing selected, a click on an occupied spot selects it (any
    /// card of a tableau column may be selected). With a selection, the
    /// click attempts the move and clears the selection either way.
    ///
    /// # Errors
    ///
    /// As [`GameSession::request_move`].
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn click(&mut self, location: Location) -> Result<ClickOutcome, SessionError> {
        let board = self.board.as_ref().ok_or(SessionError::NoGame)?;
        if self.phase.is_auto_completing() {
            return Err(SessionError::AutoCompleting);
        }

        if let Some(from) = self.selection.take() {
            let action = Move::new(from, location.as_destination());
            return self.request_move(action).map(ClickOutcome::Moved);
        }

        let selected = match location {
            Location::FreeCell { index } => board
                .free_cell(index)
                .map(|_| Source::FreeCell(index)),
            Location::Foundation { index } => board
                .foundations()
                .get(index)
                .filter(|pile| !pile.is_empty())
                .map(|_| Source::Foundation(index)),
            Location::Tableau { column, index } => board
                .tableau()
                .get(column)
                .filter(|cards| index < cards.len())
                .map(|_| Source::run(column, index)),
        };

        match selected {
            Some(source) => {
                debug!(%source, "Selected");
                self.selection = Some(source);
                Ok(ClickOutcome::Selected(source))
            }
            None => Ok(ClickOutcome::Ignored),
        }
    }

    /// Drops the current selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ─────────────────────────────────────────────────────────────
    //  Auto-complete
    // ─────────────────────────────────────────────────────────────

    /// Applies exactly one safe retirement.
    ///
    /// Returns `Ok(None)` when the session is not auto-completing.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MoveRejected`] if the executor refuses the
    /// step, which leaves the session playing.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn step_auto_complete(&mut self) -> Result<Option<StepOutcome>, SessionError> {
        if !self.phase.is_auto_completing() {
            return Ok(None);
        }
        let board = self.board.as_ref().ok_or(SessionError::NoGame)?;

        let Some(step) = next_auto_complete_move(board) else {
            warn!("Auto-complete stalled with no safe card");
            self.phase = SessionPhase::Playing;
            self.highlight = None;
            return Ok(None);
        };

        let next = match apply_move_with(board, step.as_move(), self.rule) {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "Auto-complete step rejected");
                self.phase = SessionPhase::Playing;
                self.highlight = None;
                return Err(e.into());
            }
        };

        debug!(card = %step.card, source = %step.source, "Auto-complete step");
        self.board = Some(next);
        self.highlight = Some(step.into());
        let phase = self.settle();
        Ok(Some(StepOutcome { step, phase }))
    }

    // ─────────────────────────────────────────────────────────────
    //  Internals
    // ─────────────────────────────────────────────────────────────

    /// Re-derives the phase after a board change.
    fn settle(&mut self) -> SessionPhase {
        let Some(board) = self.board.as_ref() else {
            self.phase = SessionPhase::Idle;
            return self.phase;
        };

        if board.is_won() {
            self.phase = SessionPhase::Won;
            self.selection = None;
            self.highlight = None;
            info!(moves = board.moves(), "Game won");
            self.report(true);
        } else if can_auto_complete(board) {
            if !self.phase.is_auto_completing() {
                info!(remaining = board.cards_remaining(), "Auto-complete engaged");
            }
            self.phase = SessionPhase::AutoCompleting;
            self.selection = None;
        } else {
            self.phase = SessionPhase::Playing;
            self.highlight = None;
        }
        self.phase
    }

    fn report_abandoned(&mut self) {
        let unfinished = self
            .board
            .as_ref()
            .is_some_and(|board| !board.is_won() && board.moves() > 0);
        if unfinished {
            info!("Abandoning game in progress");
            self.report(false);
        }
    }

    /// Hands the summary to the reporter once per game, if a player is
    /// signed in. Failures are logged and dropped.
    fn report(&mut self, won: bool) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        if self.reported || board.moves() == 0 {
            return;
        }
        self.reported = true;

        match self.identity.is_user_present() {
            Ok(true) => {}
            Ok(false) => {
                debug!("No player signed in, not reporting");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Identity lookup failed, not reporting");
                return;
            }
        }

        let summary = SessionSummary::new(board.moves(), board.elapsed_seconds(Utc::now()), won);
        if let Err(e) = self.reporter.record_session(summary) {
            warn!(error = %e, "Failed to report session");
        } else {
            info!(?summary, "Session reported");
        }
    }
}
