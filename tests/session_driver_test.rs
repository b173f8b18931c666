//! Driver pacing, cancellation and input gating under paused time.

use std::sync::Arc;
use std::time::Duration;

use strictly_freecell::{Destination, Move, SequenceRule, Source};
use strictly_solitaire::{
    AutoCompletePacing, DriverHandle, GameSession, Location, RecordingReporter, SessionCommand,
    SessionDriver, SessionEvent, SessionPhase, StaticIdentity,
};
use tokio::time::{Instant, sleep};

fn spawn_driver(player: Option<&str>) -> (DriverHandle, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let session = GameSession::new(
        SequenceRule::Capacity,
        Arc::new(StaticIdentity::new(player.map(str::to_string))),
        reporter.clone(),
    );
    let pacing = AutoCompletePacing::new(Duration::from_millis(300), Duration::from_millis(800));
    (SessionDriver::spawn(session, pacing), reporter)
}

/// Collects events until the game is won.
async fn events_until_won(driver: &mut DriverHandle) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Some(event) = driver.next_event().await {
        let won = matches!(event, SessionEvent::Won { .. });
        events.push(event);
        if won {
            break;
        }
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_diagnostic_game_completes_one_step_at_a_time() {
    let (mut driver, _) = spawn_driver(None);
    let started = Instant::now();
    driver.send(SessionCommand::DiagnosticGame);

    let events = events_until_won(&mut driver).await;

    let steps: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::AutoCompleteStep(step) => Some(*step),
            _ => None,
        })
        .collect();
    assert_eq!(steps.len(), 10);
    assert!(events.contains(&SessionEvent::AutoCompleteStarted));
    assert_eq!(events.last(), Some(&SessionEvent::Won { moves: 10 }));

    // 300ms before the first step, 800ms between the rest.
    assert!(started.elapsed() >= Duration::from_millis(300 + 9 * 800));

    let view = driver.snapshot().await.expect("driver running");
    assert_eq!(view.phase, SessionPhase::Won);
    driver.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_steps_wait_for_their_delay() {
    let (mut driver, _) = spawn_driver(None);
    driver.send(SessionCommand::DiagnosticGame);

    sleep(Duration::from_millis(200)).await;
    let view = driver.snapshot().await.expect("driver running");
    assert_eq!(view.phase, SessionPhase::AutoCompleting);
    assert_eq!(view.board.as_ref().map(|b| b.moves()), Some(0));

    sleep(Duration::from_millis(200)).await;
    let view = driver.snapshot().await.expect("driver running");
    assert_eq!(view.board.as_ref().map(|b| b.moves()), Some(1));
    assert!(view.highlight.is_some());

    driver.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_new_game_cancels_pending_steps() {
    let (mut driver, reporter) = spawn_driver(Some("ada"));
    driver.send(SessionCommand::DiagnosticGame);
    sleep(Duration::from_millis(1200)).await;

    let view = driver.snapshot().await.expect("driver running");
    let moves_before = view.board.as_ref().map(|b| b.moves()).unwrap_or(0);
    assert!(moves_before >= 1);

    driver.send(SessionCommand::NewGame { seed: Some(17) });
    sleep(Duration::from_secs(10)).await;

    let view = driver.snapshot().await.expect("driver running");
    assert_eq!(view.phase, SessionPhase::Playing);
    assert_eq!(view.generation, 2);
    assert_eq!(view.board.as_ref().map(|b| b.moves()), Some(0));

    // The half-finished diagnostic game counts as abandoned.
    let records = reporter.records();
    assert_eq!(records.len(), 1);
    assert!(!records[0].won);
    assert_eq!(records[0].moves, moves_before);

    driver.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_moves_rejected_while_auto_completing() {
    let (mut driver, _) = spawn_driver(None);
    driver.send(SessionCommand::DiagnosticGame);
    driver.send(SessionCommand::Move(Move::new(
        Source::column(1),
        Destination::Foundation(1),
    )));
    driver.send(SessionCommand::Click(Location::FreeCell { index: 1 }));

    let mut rejections = 0;
    while let Some(event) = driver.next_event().await {
        match event {
            SessionEvent::Rejected(reason) => {
                assert!(reason.contains("Auto-complete"));
                rejections += 1;
            }
            SessionEvent::Won { moves } => {
                assert_eq!(moves, 10);
                break;
            }
            _ => {}
        }
    }
    assert_eq!(rejections, 2);
    driver.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_pending_auto_complete() {
    let (mut driver, reporter) = spawn_driver(Some("ada"));
    driver.send(SessionCommand::DiagnosticGame);
    sleep(Duration::from_millis(400)).await;
    let snapshot = driver.snapshot().await.expect("driver running");
    assert_eq!(snapshot.board.as_ref().map(|b| b.moves()), Some(1));

    driver.shutdown().await.expect("clean shutdown");
    sleep(Duration::from_secs(10)).await;
    assert!(reporter.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_playing_game_accepts_moves_and_hints() {
    let (mut driver, _) = spawn_driver(None);
    driver.send(SessionCommand::NewGame { seed: Some(8) });
    driver.send(SessionCommand::Hint);

    let hint = loop {
        match driver.next_event().await {
            Some(SessionEvent::Hint(hint)) => break hint,
            Some(_) => continue,
            None => panic!("driver stopped"),
        }
    };
    let action = hint.expect("fresh deal has a move");

    driver.send(SessionCommand::Move(action));
    let view = loop {
        match driver.next_event().await {
            Some(SessionEvent::StateChanged(view))
                if view.board.as_ref().map(|b| b.moves()) == Some(1) =>
            {
                break view;
            }
            Some(SessionEvent::Rejected(reason)) => panic!("hint rejected: {reason}"),
            Some(_) => continue,
            None => panic!("driver stopped"),
        }
    };
    assert_eq!(view.generation, 1);
    driver.shutdown().await.expect("clean shutdown");
}
