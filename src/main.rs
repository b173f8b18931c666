//! Strictly Solitaire - Freecell CLI

#![warn(missing_docs)]

mod cli;
mod play;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use strictly_freecell::{SequenceRule, initialize_game, initialize_game_with_seed};
use strictly_solitaire::{
    FreecellConfig, GameSession, RecordingReporter, SessionCommand, SessionDriver, SessionEvent,
    StaticIdentity, StatsRepository, format_duration,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = FreecellConfig::load_or_default(&cli.config)?;
    if let Some(db_path) = cli.db_path {
        config = config.with_db_path(db_path);
    }

    match cli.command {
        Command::Deal { seed } => run_deal(seed.or(*config.seed())),
        Command::Demo => run_demo(config).await,
        Command::Play {
            seed,
            player,
            unbounded,
        } => {
            if seed.is_some() {
                config = config.with_seed(seed);
            }
            if player.is_some() {
                config = config.with_player(player);
            }
            if unbounded {
                config = config.with_sequence_rule(SequenceRule::Unbounded);
            }
            play::run_play(config).await
        }
        Command::Stats { player, recent } => run_stats(&config, player, recent),
    }
}

/// Print a freshly dealt layout
#[instrument]
fn run_deal(seed: Option<u64>) -> Result<()> {
    let board = match seed {
        Some(seed) => initialize_game_with_seed(seed),
        None => initialize_game(),
    };
    println!("{}", board.display());
    Ok(())
}

/// Run the paced auto-complete on the near-won fixture
#[instrument(skip_all)]
async fn run_demo(config: FreecellConfig) -> Result<()> {
    info!("Starting auto-complete demo");

    let session = GameSession::new(
        *config.sequence_rule(),
        Arc::new(StaticIdentity::anonymous()),
        Arc::new(RecordingReporter::new()),
    );
    let mut driver = SessionDriver::spawn(session, config.pacing());
    driver.send(SessionCommand::DiagnosticGame);

    while let Some(event) = driver.next_event().await {
        match event {
            SessionEvent::StateChanged(view) if view.highlight.is_none() => {
                if let Some(board) = view.board {
                    println!("{}\n", board.display());
                }
            }
            SessionEvent::AutoCompleteStep(step) => {
                println!("{} {} -> f{}", step.card, step.source, step.foundation);
            }
            SessionEvent::Won { moves } => {
                println!("Won in {moves} moves");
                break;
            }
            _ => {}
        }
    }

    driver.shutdown().await?;
    Ok(())
}

/// Print dashboard figures and recent games for a player
#[instrument(skip(config))]
fn run_stats(config: &FreecellConfig, player: Option<String>, recent: i64) -> Result<()> {
    let name = player
        .or_else(|| config.player().clone())
        .context("No player given; pass --player or set `player` in the config")?;

    let repo = StatsRepository::open(config.db_path().clone())?;
    let user = repo.get_or_create_user(&name)?;
    let stats = repo.display_stats(*user.id())?;

    println!("Statistics for {}", user.display_name());
    println!("  Games played:   {}", stats.games_played());
    println!("  Games won:      {}", stats.games_won());
    println!("  Win rate:       {:.1}%", stats.win_percentage());
    println!("  Average moves:  {}", stats.average_moves());
    println!(
        "  Best time:      {}",
        stats
            .best_time()
            .map(|secs| format_duration(u64::from(secs)))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Current streak: {}", stats.current_streak());
    println!("  Longest streak: {}", stats.longest_streak());

    let sessions = repo.recent_sessions(*user.id(), recent)?;
    if !sessions.is_empty() {
        println!("\nRecent games:");
    }
    for session in sessions {
        println!(
            "  {}  {:<4}  {:>3} moves  {}",
            session.completed_at().format("%Y-%m-%d %H:%M"),
            if *session.won() { "won" } else { "lost" },
            session.moves(),
            format_duration(u64::try_from(*session.time_seconds()).unwrap_or(0)),
        );
    }
    Ok(())
}
