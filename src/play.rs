//! Line-oriented terminal play.

use std::sync::Arc;

use anyhow::Result;
use derive_more::Display;
use strictly_freecell::{Destination, LocatorParseError, Move, Source};
use strictly_solitaire::{
    ChannelReporter, FreecellConfig, GameSession, IdentityProvider, RepositoryReporter,
    SessionCommand, SessionDriver, SessionEvent, SessionPhase, StaticIdentity, StatsRepository,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};

const HELP: &str = "\
Commands:
  move <from> <to>   e.g. `move t3 f0`, `move t2:4 t6`, `move c1 t0`
  hint               suggest a move
  new [seed]         abandon this game and deal another
  show               print the board
  help               this text
  quit               leave
Locators: c0-c3 free cells, t0-t7[:n] tableau (n = first card of a run), f0-f3 foundations";

/// One parsed line of input.
#[derive(Debug)]
enum Input {
    Command(SessionCommand),
    Show,
    Help,
    Quit,
}

/// Why a line could not be understood.
#[derive(Debug, Display)]
enum InputError {
    #[display("{}", _0)]
    Locator(LocatorParseError),
    #[display("Usage: move <from> <to>")]
    MoveUsage,
    #[display("Seed must be a number: '{}'", _0)]
    Seed(String),
    #[display("Unknown command '{}' (try `help`)", _0)]
    Unknown(String),
}

impl From<LocatorParseError> for InputError {
    fn from(err: LocatorParseError) -> Self {
        Self::Locator(err)
    }
}

fn parse_line(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "move" | "m" => {
            let (Some(from), Some(to), None) = (words.next(), words.next(), words.next()) else {
                return Err(InputError::MoveUsage);
            };
            let from: Source = from.parse()?;
            let to: Destination = to.parse()?;
            Input::Command(SessionCommand::Move(Move::new(from, to)))
        }
        "hint" | "h" => Input::Command(SessionCommand::Hint),
        "new" | "n" => {
            let seed = words
                .next()
                .map(|s| s.parse().map_err(|_| InputError::Seed(s.to_string())))
                .transpose()?;
            Input::Command(SessionCommand::NewGame { seed })
        }
        "show" | "s" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(input))
}

fn render(event: &SessionEvent) {
    match event {
        SessionEvent::StateChanged(view) => {
            if view.phase != SessionPhase::AutoCompleting {
                if let Some(board) = &view.board {
                    println!("\n{}", board.display());
                }
            }
        }
        SessionEvent::Rejected(reason) => println!("✗ {reason}"),
        SessionEvent::AutoCompleteStarted => println!("Auto-completing..."),
        SessionEvent::AutoCompleteStep(step) => {
            println!("  {} {} -> f{}", step.card, step.source, step.foundation)
        }
        SessionEvent::Won { moves } => println!("🏆 You won in {moves} moves! (`new` to deal again)"),
        SessionEvent::Hint(Some(action)) => println!("Try: move {} {}", action.from, action.to),
        SessionEvent::Hint(None) => println!("No moves available"),
        SessionEvent::Stopped => {}
    }
}

/// Plays one game after another until `quit` or end of input.
#[instrument(skip_all, fields(player = ?config.player()))]
pub async fn run_play(config: FreecellConfig) -> Result<()> {
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(StaticIdentity::new(config.player().clone()));
    let repo = StatsRepository::open(config.db_path().clone())?;
    let (reporter, writer) = ChannelReporter::spawn(Arc::new(RepositoryReporter::new(
        repo,
        Arc::clone(&identity),
    )));

    let session = GameSession::new(*config.sequence_rule(), identity, Arc::new(reporter));
    let mut driver = SessionDriver::spawn(session, config.pacing());
    driver.send(SessionCommand::NewGame {
        seed: *config.seed(),
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = driver.next_event() => match event {
                Some(event) => render(&event),
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => match parse_line(&line) {
                    Ok(Some(Input::Command(command))) => {
                        driver.send(command);
                    }
                    Ok(Some(Input::Show)) => {
                        if let Some(board) = driver.snapshot().await.and_then(|v| v.board) {
                            println!("\n{}", board.display());
                        }
                    }
                    Ok(Some(Input::Help)) => println!("{HELP}"),
                    Ok(Some(Input::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                },
                None => break,
            },
        }
    }

    driver.shutdown().await?;
    writer.await?;
    info!("Play finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let input = parse_line("move t3:2 t5").expect("parse");
        let expected = Move::new(Source::run(3, 2), Destination::Tableau(5));
        assert!(matches!(
            input,
            Some(Input::Command(SessionCommand::Move(action))) if action == expected
        ));
    }

    #[test]
    fn test_parse_new_with_seed() {
        assert!(matches!(
            parse_line("new 42"),
            Ok(Some(Input::Command(SessionCommand::NewGame { seed: Some(42) })))
        ));
        assert!(matches!(parse_line("new x"), Err(InputError::Seed(_))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_line("move t1"), Err(InputError::MoveUsage)));
        assert!(matches!(parse_line("move z1 t2"), Err(InputError::Locator(_))));
        assert!(matches!(parse_line("dance"), Err(InputError::Unknown(_))));
        assert!(matches!(parse_line("   "), Ok(None)));
    }
}
